// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {crate::error::FrameWriteError, bytes::BufMut};

/// A byte writer with a hard capacity bound. Appends beyond the bound fail
/// with `FrameWriteError::BufferTooSmall` and leave the buffer untouched;
/// a frame is never silently truncated.
pub struct BufferWriter {
    buf: Vec<u8>,
    cap: usize,
}

impl BufferWriter {
    pub fn new(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap), cap }
    }

    pub fn can_append(&self, bytes: usize) -> bool {
        self.buf.len() + bytes <= self.cap
    }

    pub fn append_byte(&mut self, byte: u8) -> Result<(), FrameWriteError> {
        if !self.can_append(1) {
            return Err(FrameWriteError::BufferTooSmall);
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    pub fn append_u16_le(&mut self, value: u16) -> Result<(), FrameWriteError> {
        if !self.can_append(2) {
            return Err(FrameWriteError::BufferTooSmall);
        }
        self.buf.put_u16_le(value);
        Ok(())
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), FrameWriteError> {
        if !self.can_append(bytes.len()) {
            return Err(FrameWriteError::BufferTooSmall);
        }
        self.buf.put_slice(bytes);
        Ok(())
    }

    pub fn bytes_written(&self) -> usize {
        self.buf.len()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
