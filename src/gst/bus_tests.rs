// bus_tests.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::atomic::{AtomicBool, Ordering};

use gstreamer as gst;

use super::bus::*;

fn init_gstreamer() {
    let _ = gst::init();
}

// =============================================================================
// dispatch() tests
// =============================================================================

#[test]
fn test_dispatch_eos_rewinds_and_stops() {
    init_gstreamer();
    let msg = gst::message::Eos::new();
    assert_eq!(dispatch(&msg), LoopStep::RewindAndStop);
}

#[test]
fn test_dispatch_error_stops_with_message() {
    init_gstreamer();
    let msg = gst::message::Error::new(gst::CoreError::Failed, "boom");
    match dispatch(&msg) {
        LoopStep::Fail(message) => assert!(message.contains("boom")),
        other => panic!("expected Fail, got {other:?}"),
    }
}

#[test]
fn test_dispatch_other_messages_continue() {
    init_gstreamer();
    let warning = gst::message::Warning::new(gst::CoreError::Failed, "just a warning");
    assert_eq!(dispatch(&warning), LoopStep::Continue);

    let stream_start = gst::message::StreamStart::new();
    assert_eq!(dispatch(&stream_start), LoopStep::Continue);
}

// =============================================================================
// run_bus_loop() tests
// =============================================================================

#[test]
fn test_loop_finishes_on_eos_even_if_rewind_fails() {
    init_gstreamer();
    // A pipeline in NULL state rejects the rewind seek; the loop must still
    // stop with a clean outcome.
    let pipeline = gst::Pipeline::builder().build();
    let bus = gst::Bus::new();
    bus.post(gst::message::Eos::new()).unwrap();

    let shutdown = AtomicBool::new(false);
    let outcome = run_bus_loop(&bus, &pipeline, &shutdown);
    assert_eq!(outcome, RunOutcome::Finished);
}

#[test]
fn test_loop_stops_on_error_without_rewind() {
    init_gstreamer();
    let pipeline = gst::Pipeline::builder().build();
    let bus = gst::Bus::new();
    bus.post(gst::message::Error::new(gst::CoreError::Failed, "boom"))
        .unwrap();

    let shutdown = AtomicBool::new(false);
    match run_bus_loop(&bus, &pipeline, &shutdown) {
        RunOutcome::Errored(message) => assert!(message.contains("boom")),
        other => panic!("expected Errored, got {other:?}"),
    }
}

#[test]
fn test_loop_consumes_other_messages_before_eos() {
    init_gstreamer();
    let pipeline = gst::Pipeline::builder().build();
    let bus = gst::Bus::new();
    bus.post(gst::message::StreamStart::new()).unwrap();
    bus.post(gst::message::Warning::new(gst::CoreError::Failed, "meh"))
        .unwrap();
    bus.post(gst::message::Eos::new()).unwrap();

    let shutdown = AtomicBool::new(false);
    let outcome = run_bus_loop(&bus, &pipeline, &shutdown);
    assert_eq!(outcome, RunOutcome::Finished);
}

#[test]
fn test_loop_honors_stop_token() {
    init_gstreamer();
    let pipeline = gst::Pipeline::builder().build();
    let bus = gst::Bus::new();

    let shutdown = AtomicBool::new(false);
    shutdown.store(true, Ordering::Release);
    let outcome = run_bus_loop(&bus, &pipeline, &shutdown);
    assert_eq!(outcome, RunOutcome::Interrupted);
}
