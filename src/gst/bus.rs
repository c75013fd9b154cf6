// bus.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::atomic::{AtomicBool, Ordering};

use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, error, info, warn};

use crate::error::{PullPlayError, Result};
use crate::gst::POLL_INTERVAL_MS;

/// What the dispatch loop should do after one bus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStep {
    /// Keep waiting for messages.
    Continue,
    /// End of stream: rewind to the start, then stop the loop.
    RewindAndStop,
    /// Engine reported a fatal error: stop the loop.
    Fail(String),
}

/// How a run of the bus loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The stream played through to end-of-stream.
    Finished,
    /// The stop token was raised from outside.
    Interrupted,
    /// The engine posted a fatal error.
    Errored(String),
}

/// Map one bus message to a loop step. Everything that is neither EOS nor an
/// error is consumed without a state change.
pub fn dispatch(msg: &gst::Message) -> LoopStep {
    match msg.view() {
        gst::MessageView::Eos(_) => LoopStep::RewindAndStop,
        gst::MessageView::Error(err) => LoopStep::Fail(format!(
            "{}: {}",
            err.error(),
            err.debug().unwrap_or_default()
        )),
        gst::MessageView::Warning(warning) => {
            warn!("pipeline warning: {}", warning.debug().unwrap_or_default());
            LoopStep::Continue
        }
        gst::MessageView::StateChanged(state_changed) => {
            debug!(
                "state changed: {:?} -> {:?}",
                state_changed.old(),
                state_changed.current()
            );
            LoopStep::Continue
        }
        _ => LoopStep::Continue,
    }
}

/// Flushing seek back to the start of the stream.
pub fn seek_to_start(pipeline: &gst::Pipeline) -> Result<()> {
    pipeline
        .seek_simple(gst::SeekFlags::FLUSH, gst::ClockTime::ZERO)
        .map_err(|e| PullPlayError::Seek(e.to_string()))
}

/// Drive the bus until end-of-stream, a fatal error or the stop token.
///
/// Polls with a short timeout so the stop token is observed promptly, in the
/// same way the bus is watched elsewhere in this crate. On end-of-stream one
/// rewind to position zero is attempted; if it fails the loop still stops.
pub fn run_bus_loop(
    bus: &gst::Bus,
    pipeline: &gst::Pipeline,
    shutdown: &AtomicBool,
) -> RunOutcome {
    loop {
        if shutdown.load(Ordering::Acquire) {
            info!("bus loop received stop token");
            return RunOutcome::Interrupted;
        }

        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(POLL_INTERVAL_MS)) else {
            continue;
        };

        match dispatch(&msg) {
            LoopStep::Continue => {}
            LoopStep::RewindAndStop => {
                info!("end of stream, rewinding to start");
                if let Err(err) = seek_to_start(pipeline) {
                    warn!("rewind failed: {err}");
                }
                info!("stopping bus loop");
                return RunOutcome::Finished;
            }
            LoopStep::Fail(message) => {
                error!("pipeline error: {message}");
                return RunOutcome::Errored(message);
            }
        }
    }
}
