// router.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{PullPlayError, Result};

pub const VIDEO_RAW_PREFIX: &str = "video/x-raw";
pub const AUDIO_RAW_PREFIX: &str = "audio/x-raw";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
        }
    }
}

/// Classify a negotiated media type. `None` means the pad has no caps yet
/// and is not routable.
pub fn classify(media_type: Option<&str>) -> Option<StreamKind> {
    match media_type {
        Some(name) if name.starts_with(VIDEO_RAW_PREFIX) => Some(StreamKind::Video),
        Some(name) if name.starts_with(AUDIO_RAW_PREFIX) => Some(StreamKind::Audio),
        _ => None,
    }
}

/// Media type of the first caps structure, if any.
pub fn caps_media_type(caps: Option<&gst::Caps>) -> Option<String> {
    caps.and_then(|c| c.structure(0)).map(|s| s.name().to_string())
}

/// Connects dynamically appearing demuxer pads to the typed sinks.
///
/// The router only inspects and links pads, it never owns them. Pads may
/// arrive in any order or not at all; a failed link disables that branch but
/// never stops the run.
pub struct PadRouter {
    video_sink: gst::Element,
    audio_sink: gst::Element,
}

impl PadRouter {
    pub fn new(video_sink: gst::Element, audio_sink: gst::Element) -> Self {
        Self {
            video_sink,
            audio_sink,
        }
    }

    /// Handle one newly created pad.
    pub fn route(&self, pad: &gst::Pad) {
        let caps = pad.current_caps();
        match &caps {
            Some(caps) => debug!(pad = %pad.name(), %caps, "pad added"),
            None => debug!(pad = %pad.name(), "pad added without caps"),
        }

        let media_type = caps_media_type(caps.as_ref());
        match classify(media_type.as_deref()) {
            Some(StreamKind::Video) => self.link(pad, &self.video_sink, StreamKind::Video),
            Some(StreamKind::Audio) => self.link(pad, &self.audio_sink, StreamKind::Audio),
            None => info!(
                pad = %pad.name(),
                media_type = media_type.as_deref().unwrap_or("<none>"),
                "pad not routable, ignoring"
            ),
        }
    }

    /// Called once the demuxer has exposed all pads it will ever create.
    ///
    /// A sink whose input never got linked would otherwise keep the
    /// pipeline-wide EOS from aggregating and leave its reader waiting
    /// forever, so the unrouted branch is terminated right away.
    pub fn finalize(&self) {
        for (sink, kind) in [
            (&self.video_sink, StreamKind::Video),
            (&self.audio_sink, StreamKind::Audio),
        ] {
            let Some(sink_pad) = sink.static_pad("sink") else {
                continue;
            };
            if !sink_pad.is_linked() {
                info!(%kind, "no pad routed to sink, terminating branch");
                if !sink_pad.send_event(gst::event::Eos::new()) {
                    warn!(%kind, "failed to terminate unrouted branch");
                }
            }
        }
    }

    fn link(&self, pad: &gst::Pad, sink: &gst::Element, kind: StreamKind) {
        match self.try_link(pad, sink) {
            Ok(()) => info!(%kind, pad = %pad.name(), "pad linked"),
            Err(err) => warn!(%kind, "pad link failed, branch disabled: {err}"),
        }
    }

    fn try_link(&self, pad: &gst::Pad, sink: &gst::Element) -> Result<()> {
        let sink_pad = sink
            .static_pad("sink")
            .ok_or_else(|| PullPlayError::Link(format!("{} has no sink pad", sink.name())))?;
        if sink_pad.is_linked() {
            return Err(PullPlayError::Link(format!(
                "{} is already linked",
                sink.name()
            )));
        }
        pad.link(&sink_pad)
            .map_err(|e| PullPlayError::Link(format!("{e:?}")))?;
        Ok(())
    }
}
