// Copyright 2021 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use thiserror::Error;

/// Error for writing a frame or element into a bounded buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameWriteError {
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("attempted to write an invalid frame: {0}")]
    InvalidData(String),
}

impl FrameWriteError {
    pub fn new_invalid_data(msg: impl Into<String>) -> Self {
        FrameWriteError::InvalidData(msg.into())
    }
}

/// Error for parsing a received frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameParseError {
    #[error("frame too short")]
    FrameTooShort,
    #[error("unexpected field value: {0}")]
    UnexpectedFieldValue(&'static str),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("error writing frame: {0}")]
    WritingFrame(#[from] FrameWriteError),
    #[error("error parsing frame: {0}")]
    ParsingFrame(#[from] FrameParseError),
    #[error("collaborator failed to build an element: {0}")]
    BuildFailure(&'static str),
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}
