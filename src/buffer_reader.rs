// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use bytes::Buf;

/// A cursor over a received byte slice. Reads never panic; a read past the
/// end returns `None` and leaves the cursor unchanged.
pub struct BufferReader<'a> {
    buf: &'a [u8],
}

impl<'a> BufferReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { buf: bytes }
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        if self.buf.remaining() < 2 {
            return None;
        }
        Some(self.buf.get_u16_le())
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        if self.buf.remaining() < 1 {
            return None;
        }
        Some(self.buf.get_u8())
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.buf.len() < len {
            return None;
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Some(head)
    }

    pub fn into_remaining(self) -> &'a [u8] {
        self.buf
    }
}
