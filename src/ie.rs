// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Reading and writing of information elements (IEs): tagged
//! `{id, length, value}` blocks inside management frame bodies.

use crate::{buffer_writer::BufferWriter, error::FrameWriteError, mac};

pub const IE_HDR_LEN: usize = 2;
pub const IE_MAX_LEN: usize = 255;
/// IEEE Std 802.11-2016, 9.4.2.3: the Supported Rates element carries at
/// most eight rates; the remainder goes into Extended Supported Rates.
pub const SUPPORTED_RATES_MAX_LEN: usize = 8;

/// IEEE Std 802.11-2016, 9.4.2.1, Table 9-77
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub u8);

impl Id {
    pub const SSID: Self = Id(0);
    pub const SUPPORTED_RATES: Self = Id(1);
    pub const CHALLENGE_TEXT: Self = Id(16);
    pub const POWER_CAPABILITY: Self = Id(33);
    pub const HT_CAPABILITIES: Self = Id(45);
    pub const RSNE: Self = Id(48);
    pub const EXT_SUPPORTED_RATES: Self = Id(50);
    pub const VENDOR_SPECIFIC: Self = Id(221);
}

/// Aironet proprietary element advertised by Cisco APs.
pub const CISCO_AIRONET_IE_ID: Id = Id(0x85);
pub const CISCO_OUI: [u8; 3] = [0x00, 0x40, 0x96];

/// An iterator over the `(id, body)` pairs of a chain of IEs. Iteration ends
/// at the first element whose declared length exceeds the remaining bytes.
pub struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader(bytes)
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = (Id, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.len() < IE_HDR_LEN {
            return None;
        }
        let id = Id(self.0[0]);
        let body_len = self.0[1] as usize;
        if self.0.len() < IE_HDR_LEN + body_len {
            return None;
        }
        let body = &self.0[IE_HDR_LEN..IE_HDR_LEN + body_len];
        self.0 = &self.0[IE_HDR_LEN + body_len..];
        Some((id, body))
    }
}

pub fn write_ie(buf: &mut BufferWriter, id: Id, body: &[u8]) -> Result<(), FrameWriteError> {
    if body.len() > IE_MAX_LEN {
        return Err(FrameWriteError::new_invalid_data(format!(
            "IE body too large: {} bytes",
            body.len()
        )));
    }
    if !buf.can_append(IE_HDR_LEN + body.len()) {
        return Err(FrameWriteError::BufferTooSmall);
    }
    buf.append_byte(id.0)?;
    buf.append_byte(body.len() as u8)?;
    buf.append_bytes(body)
}

pub fn write_ssid(buf: &mut BufferWriter, ssid: &[u8]) -> Result<(), FrameWriteError> {
    write_ie(buf, Id::SSID, ssid)
}

pub fn write_supported_rates(buf: &mut BufferWriter, rates: &[u8]) -> Result<(), FrameWriteError> {
    if rates.is_empty() {
        return Err(FrameWriteError::new_invalid_data("no rates to write"));
    }
    write_ie(buf, Id::SUPPORTED_RATES, rates)
}

pub fn write_ext_supported_rates(
    buf: &mut BufferWriter,
    rates: &[u8],
) -> Result<(), FrameWriteError> {
    if rates.is_empty() {
        return Err(FrameWriteError::new_invalid_data("no rates to write"));
    }
    write_ie(buf, Id::EXT_SUPPORTED_RATES, rates)
}

pub fn write_challenge_text(
    buf: &mut BufferWriter,
    challenge: &[u8],
) -> Result<(), FrameWriteError> {
    write_ie(buf, Id::CHALLENGE_TEXT, challenge)
}

/// IEEE Std 802.11-2016, 9.4.2.14
pub fn write_power_capability(
    buf: &mut BufferWriter,
    min_tx_power_dbm: u8,
    max_tx_power_dbm: u8,
) -> Result<(), FrameWriteError> {
    write_ie(buf, Id::POWER_CAPABILITY, &[min_tx_power_dbm, max_tx_power_dbm])
}

/// Writes the station's rate set, split across Supported Rates and Extended
/// Supported Rates at the first ERP-OFDM rate when operating in mixed b/g
/// mode. `rates` must be sorted ascending by rate value.
pub struct RatesWriter<'a>(&'a [u8]);

impl<'a> RatesWriter<'a> {
    pub fn try_new(rates: &'a [u8]) -> Result<RatesWriter<'a>, FrameWriteError> {
        if rates.is_empty() {
            Err(FrameWriteError::new_invalid_data("no rates to write"))
        } else if rates.len() > SUPPORTED_RATES_MAX_LEN + IE_MAX_LEN {
            Err(FrameWriteError::new_invalid_data("rates will not fit in elements"))
        } else {
            Ok(RatesWriter(rates))
        }
    }

    /// Index of the first OFDM-capable rate; `len` when the set is CCK-only.
    pub fn first_ofdm_index(&self) -> usize {
        self.0.iter().position(|&r| mac::is_ofdm_rate(r)).unwrap_or(self.0.len())
    }

    /// True if the highest rate in the (sorted) set is an OFDM rate.
    pub fn highest_rate_is_ofdm(&self) -> bool {
        self.0.last().map_or(false, |&r| mac::is_ofdm_rate(r))
    }

    /// Writes the set without an OFDM split; rates beyond the eighth spill
    /// into Extended Supported Rates.
    pub fn write_all(&self, buf: &mut BufferWriter) -> Result<(), FrameWriteError> {
        if self.0.len() <= SUPPORTED_RATES_MAX_LEN {
            write_supported_rates(buf, self.0)
        } else {
            write_supported_rates(buf, &self.0[..SUPPORTED_RATES_MAX_LEN])?;
            write_ext_supported_rates(buf, &self.0[SUPPORTED_RATES_MAX_LEN..])
        }
    }

    /// Writes the non-OFDM prefix as Supported Rates and the OFDM suffix as
    /// Extended Supported Rates. Must only be called when the set contains
    /// at least one OFDM rate.
    pub fn write_split(&self, buf: &mut BufferWriter) -> Result<(), FrameWriteError> {
        let split = self.first_ofdm_index();
        if split == 0 || split == self.0.len() {
            return Err(FrameWriteError::new_invalid_data("rate set cannot be split"));
        }
        write_supported_rates(buf, &self.0[..split])?;
        write_ext_supported_rates(buf, &self.0[split..])
    }
}

/// Extracts the RSN data of an assoc response body by concatenating every
/// RSNE occurrence, element headers included, up to `max_len` bytes.
/// Returns `None` if the body carries no RSNE.
pub fn merge_rsn_ies(ies: &[u8], max_len: usize) -> Option<Vec<u8>> {
    let mut merged = Vec::new();
    for (id, body) in Reader::new(ies) {
        if id != Id::RSNE {
            continue;
        }
        if merged.len() + IE_HDR_LEN + body.len() > max_len {
            break;
        }
        merged.push(id.0);
        merged.push(body.len() as u8);
        merged.extend_from_slice(body);
    }
    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// True if the body carries a Cisco vendor element (Aironet proprietary id
/// or a vendor-specific element with the Cisco OUI).
pub fn has_cisco_ie(ies: &[u8]) -> bool {
    Reader::new(ies).any(|(id, body)| {
        id == CISCO_AIRONET_IE_ID
            || (id == Id::VENDOR_SPECIFIC && body.len() >= 3 && body[..3] == CISCO_OUI)
    })
}

/// Returns the body of the first element with the given id, if present.
pub fn find_ie(ies: &[u8], id: Id) -> Option<&[u8]> {
    Reader::new(ies).find(|(ie_id, _)| *ie_id == id).map(|(_, body)| body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        assert_eq!(None, Reader::new(&[][..]).next());
    }

    #[test]
    fn less_than_header() {
        assert_eq!(None, Reader::new(&[0][..]).next());
    }

    #[test]
    fn body_too_short() {
        assert_eq!(None, Reader::new(&[0, 2, 10][..]).next());
    }

    #[test]
    fn two_elements() {
        let bytes = vec![0, 2, 10, 20, 1, 3, 11, 22, 33];
        let elems: Vec<_> = Reader::new(&bytes[..]).collect();
        assert_eq!(
            &[(Id::SSID, &[10, 20][..]), (Id::SUPPORTED_RATES, &[11, 22, 33][..])],
            &elems[..]
        );
    }

    #[test]
    fn write_ie_with_header() {
        let mut buf = BufferWriter::new(16);
        write_ssid(&mut buf, b"foo").expect("SSID fits");
        assert_eq!(&buf.into_vec()[..], &[0, 3, b'f', b'o', b'o']);
    }

    #[test]
    fn write_ie_rejects_oversized_body() {
        let mut buf = BufferWriter::new(512);
        let body = [0u8; IE_MAX_LEN + 1];
        assert!(write_ie(&mut buf, Id::CHALLENGE_TEXT, &body[..]).is_err());
    }

    #[test]
    fn rates_single_element_when_no_ofdm() {
        let rates = [2, 4, 11, 22];
        let writer = RatesWriter::try_new(&rates[..]).expect("valid rates");
        assert_eq!(writer.first_ofdm_index(), 4);
        assert!(!writer.highest_rate_is_ofdm());
        let mut buf = BufferWriter::new(16);
        writer.write_all(&mut buf).expect("fits");
        assert_eq!(&buf.into_vec()[..], &[1, 4, 2, 4, 11, 22]);
    }

    #[test]
    fn rates_split_at_first_ofdm_rate() {
        let rates = [2, 4, 11, 22, 12 | 0x80, 24, 48];
        let writer = RatesWriter::try_new(&rates[..]).expect("valid rates");
        assert_eq!(writer.first_ofdm_index(), 4);
        let mut buf = BufferWriter::new(32);
        writer.write_split(&mut buf).expect("fits");
        assert_eq!(
            &buf.into_vec()[..],
            &[
                1, 4, 2, 4, 11, 22, // Supported Rates: CCK prefix
                50, 3, 12 | 0x80, 24, 48, // Extended Supported Rates: OFDM suffix
            ]
        );
    }

    #[test]
    fn rates_spill_into_extended_element() {
        let rates = [2, 4, 11, 22, 12, 18, 24, 36, 48, 72];
        let writer = RatesWriter::try_new(&rates[..]).expect("valid rates");
        let mut buf = BufferWriter::new(32);
        writer.write_all(&mut buf).expect("fits");
        assert_eq!(
            &buf.into_vec()[..],
            &[1, 8, 2, 4, 11, 22, 12, 18, 24, 36, 50, 2, 48, 72]
        );
    }

    #[test]
    fn rates_empty_error() {
        assert!(RatesWriter::try_new(&[][..]).is_err());
    }

    #[test]
    fn merge_multiple_rsn_ies() {
        let bytes = [
            0, 1, 7, // SSID, ignored
            48, 2, 1, 2, // first RSNE
            221, 1, 9, // vendor, ignored
            48, 3, 3, 4, 5, // second RSNE
        ];
        let merged = merge_rsn_ies(&bytes[..], 255).expect("rsn present");
        assert_eq!(&merged[..], &[48, 2, 1, 2, 48, 3, 3, 4, 5]);
    }

    #[test]
    fn merge_rsn_ies_absent() {
        let bytes = [0, 1, 7, 221, 1, 9];
        assert_eq!(merge_rsn_ies(&bytes[..], 255), None);
    }

    #[test]
    fn merge_rsn_ies_respects_bound() {
        let mut bytes = vec![48, 200];
        bytes.extend_from_slice(&[0xAA; 200]);
        bytes.extend_from_slice(&[48, 100]);
        bytes.extend_from_slice(&[0xBB; 100]);
        let merged = merge_rsn_ies(&bytes[..], 255).expect("first fits");
        // Second occurrence would exceed the bound and is dropped.
        assert_eq!(merged.len(), 202);
    }

    #[test]
    fn cisco_ie_detection() {
        let aironet = [0x85, 1, 0];
        assert!(has_cisco_ie(&aironet[..]));
        let cisco_vendor = [221, 4, 0x00, 0x40, 0x96, 0x01];
        assert!(has_cisco_ie(&cisco_vendor[..]));
        let other_vendor = [221, 4, 0x00, 0x50, 0xF2, 0x01];
        assert!(!has_cisco_ie(&other_vendor[..]));
    }

    #[test]
    fn find_ie_by_id() {
        let bytes = [0, 1, 7, 16, 2, 8, 9];
        assert_eq!(find_ie(&bytes[..], Id::CHALLENGE_TEXT), Some(&[8, 9][..]));
        assert_eq!(find_ie(&bytes[..], Id::RSNE), None);
    }
}
