// mod.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod bus;
pub mod player;
pub mod reader;
pub mod router;
pub mod source;

pub use bus::RunOutcome;
pub use player::{Player, RunSummary};
pub use reader::{ReaderOutcome, ReaderReport, SampleMeta};
pub use router::{PadRouter, StreamKind};
pub use source::ByteSource;

/// How long a bus poll or sink pull blocks before rechecking the stop token.
pub const POLL_INTERVAL_MS: u64 = 100;

#[cfg(test)]
mod bus_tests;

#[cfg(test)]
mod player_tests;
