// player.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use tracing::{debug, info, warn};

use crate::error::{PullPlayError, Result};
use crate::gst::bus::{run_bus_loop, RunOutcome};
use crate::gst::reader::{run_reader, ReaderReport};
use crate::gst::router::{PadRouter, StreamKind};
use crate::gst::source::{attach_source_callbacks, ByteSource};

/// Final tally of one playback run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub video: ReaderReport,
    pub audio: ReaderReport,
}

/// Owns the appsrc -> decodebin -> appsink graph and drives one playback run.
///
/// Demuxer pads are wired lazily by the router as they appear; the two typed
/// sinks are created up front but stay unlinked until then.
pub struct Player {
    pipeline: gst::Pipeline,
    video_sink: gst_app::AppSink,
    audio_sink: gst_app::AppSink,
    shutdown: Arc<AtomicBool>,
}

impl Player {
    /// Open the input and assemble the pipeline graph.
    ///
    /// Fails with an input error before any pipeline exists when the file
    /// cannot be opened or has zero length.
    pub fn new(path: &Path) -> Result<Self> {
        let source = ByteSource::open(path)?;
        info!(path = %path.display(), size = source.total(), "input opened");

        let pipeline = gst::Pipeline::builder().name("pullplay").build();

        let appsrc = gst_app::AppSrc::builder()
            .name("source")
            .format(gst::Format::Bytes)
            .size(source.total() as i64)
            .stream_type(gst_app::AppStreamType::Seekable)
            .build();

        let decodebin = gst::ElementFactory::make("decodebin")
            .name("decoder")
            .build()
            .map_err(|e| PullPlayError::GStreamer(format!("failed to create decodebin: {e}")))?;

        let video_sink = gst_app::AppSink::builder().name("video_sink").build();
        let audio_sink = gst_app::AppSink::builder().name("audio_sink").build();

        pipeline
            .add_many([
                appsrc.upcast_ref(),
                &decodebin,
                video_sink.upcast_ref(),
                audio_sink.upcast_ref(),
            ])
            .map_err(|e| PullPlayError::GStreamer(format!("failed to assemble pipeline: {e}")))?;

        appsrc
            .link(&decodebin)
            .map_err(|e| PullPlayError::GStreamer(format!("failed to link source: {e}")))?;

        let router = Arc::new(PadRouter::new(
            video_sink.clone().upcast(),
            audio_sink.clone().upcast(),
        ));
        let pad_router = Arc::clone(&router);
        decodebin.connect_pad_added(move |_element, pad| pad_router.route(pad));
        decodebin.connect_no_more_pads(move |_element| router.finalize());

        attach_source_callbacks(&appsrc, Arc::new(Mutex::new(source)));

        Ok(Self {
            pipeline,
            video_sink,
            audio_sink,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Stop token shared with the bus loop and both readers. Raising it makes
    /// them return at their next poll interval.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn play(&self) -> Result<()> {
        self.set_state(gst::State::Playing)
    }

    /// Safe to call at any point, including before playback ever started.
    pub fn stop(&self) -> Result<()> {
        self.set_state(gst::State::Null)
    }

    fn set_state(&self, state: gst::State) -> Result<()> {
        self.pipeline
            .set_state(state)
            .map_err(|e| PullPlayError::StateChangeFailed(format!("{state:?}: {e}")))?;
        debug!(?state, "requested pipeline state");
        Ok(())
    }

    /// Run the pipeline to completion.
    ///
    /// Sequence: start, spawn one reader per typed sink, block on the bus
    /// loop until it stops, join both readers, then tear the pipeline down.
    /// The readers are always joined before the pipeline is released.
    pub async fn run(&self) -> Result<RunSummary> {
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| PullPlayError::Engine("pipeline has no bus".to_string()))?;

        self.play()?;

        let video_task = self.spawn_reader(StreamKind::Video, self.video_sink.clone());
        let audio_task = self.spawn_reader(StreamKind::Audio, self.audio_sink.clone());

        let pipeline = self.pipeline.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let bus_task =
            tokio::task::spawn_blocking(move || run_bus_loop(&bus, &pipeline, &shutdown));

        let outcome = bus_task
            .await
            .map_err(|e| PullPlayError::Engine(format!("bus loop task failed: {e}")))?;

        // Release the readers; each one still drains any samples its sink has
        // buffered before honoring the token.
        self.shutdown.store(true, Ordering::Release);

        let video = video_task
            .await
            .map_err(|e| PullPlayError::Engine(format!("video reader task failed: {e}")))?;
        let audio = audio_task
            .await
            .map_err(|e| PullPlayError::Engine(format!("audio reader task failed: {e}")))?;

        if let Err(err) = self.stop() {
            warn!("stopping pipeline failed: {err}");
        }

        Ok(RunSummary {
            outcome,
            video,
            audio,
        })
    }

    fn spawn_reader(
        &self,
        kind: StreamKind,
        appsink: gst_app::AppSink,
    ) -> tokio::task::JoinHandle<ReaderReport> {
        let shutdown = Arc::clone(&self.shutdown);
        tokio::task::spawn_blocking(move || run_reader(kind, &appsink, &shutdown))
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        debug!("dropping player");
        self.shutdown.store(true, Ordering::Release);
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
