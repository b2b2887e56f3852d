// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Authentication frame construction and parsing, plus the per-phase record
//! tracking the exchange (algorithm in flight, retries, shared-key
//! challenge).

use crate::{
    buffer_reader::BufferReader,
    buffer_writer::BufferWriter,
    error::{FrameParseError, FrameWriteError},
    ie,
    mac::AuthAlgorithmNumber,
    AUTH_HDR_LEN, MAX_AUTH_FRAME_LEN, MAX_CHALLENGE_LEN,
};

/// Authentication transaction sequence numbers.
/// IEEE Std 802.11-2016, 12.3.3.2 (open) and 12.3.3.3 (shared key).
pub const AUTH_SEQ_REQUEST: u16 = 1;
pub const AUTH_SEQ_RESPONSE: u16 = 2;
pub const AUTH_SEQ_CHALLENGE_RESPONSE: u16 = 3;
pub const AUTH_SEQ_CONFIRM: u16 = 4;

/// Mutable state of the authentication exchange within one link attempt.
#[derive(Debug)]
pub struct AuthPhase {
    /// Algorithm currently in flight. Received frames carrying a different
    /// algorithm are dropped without a state change.
    pub algorithm: AuthAlgorithmNumber,
    /// Number of retransmissions so far; the initial transmission does not
    /// count. Never exceeds the configured maximum at the moment of a send.
    pub retry_count: u32,
    /// Challenge text copied out of the shared-key seq-2 response.
    pub challenge: Option<Vec<u8>>,
    /// Last frame body handed to the transport, resent verbatim on timeout.
    pub last_frame: Vec<u8>,
    pub reject_count: u64,
    pub timeout_count: u64,
}

impl AuthPhase {
    pub fn new() -> Self {
        Self {
            algorithm: AuthAlgorithmNumber::OpenSystem,
            retry_count: 0,
            challenge: None,
            last_frame: Vec::new(),
            reject_count: 0,
            timeout_count: 0,
        }
    }

    /// Resets the exchange for a fresh transmission with `algorithm` while
    /// keeping the diagnostic counters.
    pub fn restart(&mut self, algorithm: AuthAlgorithmNumber) {
        self.algorithm = algorithm;
        self.retry_count = 0;
        self.challenge = None;
        self.last_frame.clear();
    }
}

/// Serializes an authentication frame body: LE algorithm, sequence and
/// status fields followed by the caller's opaque element blob (challenge
/// text for shared-key message 3, RSN/FT elements otherwise).
pub fn write_auth_frame(
    algorithm: AuthAlgorithmNumber,
    sequence: u16,
    status: u16,
    ies: &[u8],
) -> Result<Vec<u8>, FrameWriteError> {
    let mut w = BufferWriter::new(MAX_AUTH_FRAME_LEN);
    w.append_u16_le(algorithm as u16)?;
    w.append_u16_le(sequence)?;
    w.append_u16_le(status)?;
    w.append_bytes(ies)?;
    Ok(w.into_vec())
}

/// Serializes the shared-key message 3: the received challenge echoed back
/// as a Challenge Text element.
pub fn write_challenge_response(challenge: &[u8]) -> Result<Vec<u8>, FrameWriteError> {
    let mut w = BufferWriter::new(MAX_AUTH_FRAME_LEN);
    w.append_u16_le(AuthAlgorithmNumber::SharedKey as u16)?;
    w.append_u16_le(AUTH_SEQ_CHALLENGE_RESPONSE)?;
    w.append_u16_le(0)?;
    ie::write_challenge_text(&mut w, challenge)?;
    Ok(w.into_vec())
}

/// Fixed fields of a received authentication frame plus the challenge text
/// element, when one is present.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedAuthFrame<'a> {
    /// Raw algorithm number; may be outside the known set.
    pub algorithm: u16,
    pub sequence: u16,
    pub status: u16,
    pub challenge: Option<&'a [u8]>,
}

pub fn parse_auth_frame(body: &[u8]) -> Result<ParsedAuthFrame<'_>, FrameParseError> {
    let mut r = BufferReader::new(body);
    let algorithm = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    let sequence = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    let status = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    let challenge = ie::find_ie(r.into_remaining(), ie::Id::CHALLENGE_TEXT);
    if let Some(c) = challenge {
        if c.len() > MAX_CHALLENGE_LEN {
            return Err(FrameParseError::UnexpectedFieldValue("challenge too long"));
        }
    }
    Ok(ParsedAuthFrame { algorithm, sequence, status, challenge })
}
