// reader.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::atomic::{AtomicBool, Ordering};

use gstreamer as gst;
use gstreamer_app as gst_app;
use tracing::{debug, info, warn};

use crate::error::{PullPlayError, Result};
use crate::gst::router::StreamKind;
use crate::gst::POLL_INTERVAL_MS;

/// Type-specific metadata carried by a decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMeta {
    Video { width: i32, height: i32 },
    Audio { rate: i32, channels: i32 },
}

/// Why a reader loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderOutcome {
    /// The sink reported exhaustion after end-of-stream.
    Drained,
    /// A sample arrived without negotiated caps.
    MalformedSample,
    /// The stop token was raised while the sink was still open.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderReport {
    pub kind: StreamKind,
    pub samples: u64,
    pub outcome: ReaderOutcome,
}

/// Extract the metadata of one pulled sample.
///
/// A sample without caps is a malformed stream condition for the reader.
/// Individual fields missing from the caps default to zero.
pub fn describe_sample(kind: StreamKind, sample: &gst::Sample) -> Result<SampleMeta> {
    let caps = sample
        .caps()
        .ok_or_else(|| PullPlayError::ReaderTerminated(format!("{kind} sample carries no caps")))?;
    let structure = caps
        .structure(0)
        .ok_or_else(|| PullPlayError::ReaderTerminated(format!("{kind} sample caps are empty")))?;

    Ok(match kind {
        StreamKind::Video => SampleMeta::Video {
            width: structure.get::<i32>("width").unwrap_or(0),
            height: structure.get::<i32>("height").unwrap_or(0),
        },
        StreamKind::Audio => SampleMeta::Audio {
            rate: structure.get::<i32>("rate").unwrap_or(0),
            channels: structure.get::<i32>("channels").unwrap_or(0),
        },
    })
}

/// Pull decoded samples from one sink until it is exhausted.
///
/// Runs as an independent blocking task. Pulls are bounded so exhaustion and
/// the stop token are rechecked on every timeout. Once the sink has seen
/// end-of-stream its queue is finite and is drained fully before the token
/// is honored; under continuous sample flow the token ends the loop after
/// the current sample. The reader never fails the pipeline, it only exits
/// and reports its final count.
pub fn run_reader(
    kind: StreamKind,
    appsink: &gst_app::AppSink,
    shutdown: &AtomicBool,
) -> ReaderReport {
    info!(%kind, "sink reader started");

    let mut samples: u64 = 0;
    let outcome = loop {
        let Some(sample) = appsink.try_pull_sample(gst::ClockTime::from_mseconds(POLL_INTERVAL_MS))
        else {
            if appsink.is_eos() {
                break ReaderOutcome::Drained;
            }
            if shutdown.load(Ordering::Acquire) {
                break ReaderOutcome::Cancelled;
            }
            continue;
        };

        samples += 1;
        match describe_sample(kind, &sample) {
            Ok(SampleMeta::Video { width, height }) => {
                debug!(samples, width, height, "video sample");
            }
            Ok(SampleMeta::Audio { rate, channels }) => {
                debug!(samples, rate, channels, "audio sample");
            }
            Err(err) => {
                warn!(%kind, "stopping reader: {err}");
                break ReaderOutcome::MalformedSample;
            }
        }

        // Without EOS in the sink a raised token must not wait for the
        // producer to pause; with EOS the remaining queue is drained fully.
        if shutdown.load(Ordering::Acquire) && !appsink.is_eos() {
            break ReaderOutcome::Cancelled;
        }
    };

    info!(%kind, samples, ?outcome, "sink reader finished");
    ReaderReport {
        kind,
        samples,
        outcome,
    }
}
