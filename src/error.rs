// error.rs
//
// This file is part of pullplay
//
// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PullPlayError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("GStreamer error: {0}")]
    GStreamer(String),

    #[error("State change failed: {0}")]
    StateChangeFailed(String),

    #[error("Link failed: {0}")]
    Link(String),

    #[error("Seek failed: {0}")]
    Seek(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Reader terminated: {0}")]
    ReaderTerminated(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PullPlayError>;
