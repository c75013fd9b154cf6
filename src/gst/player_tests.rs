// player_tests.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::io::Write;

use gstreamer as gst;

use super::bus::RunOutcome;
use super::player::*;
use crate::error::PullPlayError;

fn init_gstreamer() {
    let _ = gst::init();
}

fn have_decodebin() -> bool {
    gst::ElementFactory::find("decodebin").is_some()
}

fn input_file(len: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    file.write_all(&data).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_new_missing_file_fails_with_input_error() {
    init_gstreamer();
    let result = Player::new(std::path::Path::new("/nonexistent/input.mp4"));
    assert!(matches!(result, Err(PullPlayError::Input(_))));
}

#[test]
fn test_new_empty_file_fails_with_input_error() {
    init_gstreamer();
    let file = tempfile::NamedTempFile::new().unwrap();
    let result = Player::new(file.path());
    assert!(matches!(result, Err(PullPlayError::Input(_))));
}

#[test]
fn test_new_builds_pipeline_for_valid_file() {
    init_gstreamer();
    if !have_decodebin() {
        eprintln!("decodebin not available, skipping");
        return;
    }

    let file = input_file(1000);
    let player = Player::new(file.path()).unwrap();

    // stop() must be safe even though playback never started.
    player.stop().unwrap();
}

#[tokio::test]
async fn test_run_tears_down_on_undecodable_input() {
    init_gstreamer();
    if !have_decodebin() {
        eprintln!("decodebin not available, skipping");
        return;
    }

    // Patterned bytes that no typefinder recognizes: the engine reports a
    // fatal error and the run must still tear down through the normal path,
    // joining both readers with zero samples.
    let file = input_file(4096);
    let player = Player::new(file.path()).unwrap();

    let summary = player.run().await.unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Errored(_)));
    assert_eq!(summary.video.samples, 0);
    assert_eq!(summary.audio.samples, 0);
}
