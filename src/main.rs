// main.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pullplay::{Player, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "pullplay")]
#[command(version)]
#[command(about = "Demand-paced GStreamer playback of a local media file")]
struct Args {
    /// Path to the input media file
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pullplay=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    gstreamer::init()?;
    info!("GStreamer initialized");

    let player = match Player::new(&args.file) {
        Ok(player) => player,
        Err(e) => {
            error!("initialization failed: {e}");
            std::process::exit(1);
        }
    };

    let shutdown = player.shutdown_flag();
    let run = player.run();
    tokio::pin!(run);

    let summary = tokio::select! {
        summary = &mut run => summary?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            shutdown.store(true, Ordering::Release);
            (&mut run).await?
        }
    };

    info!(
        video_samples = summary.video.samples,
        audio_samples = summary.audio.samples,
        "playback finished"
    );

    if let RunOutcome::Errored(message) = summary.outcome {
        error!("run failed: {message}");
        std::process::exit(1);
    }

    Ok(())
}
