// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! MLME link establishment for an 802.11 station: the authentication and
//! association exchange with an AP, driven by a table-based state machine
//! with bounded retries and hand-built management frame bodies. The
//! surrounding driver supplies timers, frame transport and configuration
//! through the traits in [`device`] and receives a single terminal result
//! per attempt.

mod buffer_reader;
mod buffer_writer;

pub mod client;
pub mod device;
pub mod error;
pub mod ie;
pub mod mac;
pub mod timer;

pub use crate::{buffer_reader::BufferReader, buffer_writer::BufferWriter};

/// Longest challenge text accepted from a shared-key seq-2 response.
pub const MAX_CHALLENGE_LEN: usize = 256;
/// Fixed fields of an authentication frame body: algorithm, sequence,
/// status.
pub const AUTH_HDR_LEN: usize = 6;
pub const MAX_AUTH_FRAME_LEN: usize = MAX_CHALLENGE_LEN + AUTH_HDR_LEN;
/// Bound on the RSN data extracted from an association response.
pub const MAX_RSN_IE_LEN: usize = 256;
/// Bound on the caller-provided element blob carried in auth frames.
pub const MAX_EXTRA_IES_LEN: usize = 512;
pub const MAX_ASSOC_FRAME_LEN: usize = 512 + MAX_EXTRA_IES_LEN;
