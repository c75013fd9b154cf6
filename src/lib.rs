// lib.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod error;
pub mod gst;

pub use error::{PullPlayError, Result};
pub use gst::{Player, RunOutcome, RunSummary};
