// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Association request construction and association response parsing.

use {
    crate::{
        buffer_reader::BufferReader,
        buffer_writer::BufferWriter,
        client::Context,
        device::{BssType, CipherSuite, Dot11Mode, PreambleType},
        error::{Error, FrameParseError},
        ie,
        mac::{self, CapabilityInfo, MacAddr},
        MAX_ASSOC_FRAME_LEN, MAX_RSN_IE_LEN,
    },
    log::warn,
};

/// Mutable state of the association exchange within one link attempt.
#[derive(Debug)]
pub struct AssocPhase {
    /// Selects the Reassociation Request subtype and the Current AP Address
    /// field.
    pub is_reassociation: bool,
    pub retry_count: u32,
    /// Last request body sent, kept for retransmission and for downstream
    /// consumers such as key exchange.
    pub request_buffer: Vec<u8>,
    /// Last response body received.
    pub response_buffer: Vec<u8>,
    pub disassociate_pending: bool,
    pub reject_count: u64,
    pub timeout_count: u64,
}

impl AssocPhase {
    pub fn new() -> Self {
        Self {
            is_reassociation: false,
            retry_count: 0,
            request_buffer: Vec::new(),
            response_buffer: Vec::new(),
            disassociate_pending: false,
            reject_count: 0,
            timeout_count: 0,
        }
    }
}

fn capability_info(ctx: &mut Context, rates: &[u8]) -> CapabilityInfo {
    let mut cap = CapabilityInfo(0);
    match ctx.site.bss_type() {
        BssType::Infrastructure => cap.set_ess(true),
        BssType::Independent => cap.set_ibss(true),
    }
    cap.set_privacy(ctx.rsn.encryption_status() != CipherSuite::None);
    cap.set_short_preamble(ctx.site.preamble() == PreambleType::Short);
    cap.set_pbcc(rates.iter().any(|&r| r & !mac::RATE_BASIC_BIT == mac::RATE_PBCC_22MBPS));
    cap.set_spectrum_mgmt(ctx.regulatory.spectrum_management_enabled());
    // Short slot time requires ERP operation with an OFDM top rate.
    let highest_is_ofdm = rates.last().map_or(false, |&r| mac::is_ofdm_rate(r));
    cap.set_short_slot_time(ctx.site.operational_mode() == Dot11Mode::G && highest_is_ofdm);
    cap.set_immediate_block_ack(ctx.sta_cap.ht_enabled() && ctx.qos.wme_enabled());
    cap
}

fn ht_allowed(ctx: &Context) -> bool {
    match ctx.rsn.encryption_status() {
        CipherSuite::Tkip | CipherSuite::Wep40 | CipherSuite::Wep104 => false,
        CipherSuite::None | CipherSuite::Ccmp => true,
    }
}

/// Assembles a (re)association request body. Element order is fixed by
/// IEEE Std 802.11-2016, 9.3.3.6/9.3.3.8. Any overflow of
/// `MAX_ASSOC_FRAME_LEN` fails the build; a truncated request is never
/// produced.
pub fn build_assoc_request(ctx: &mut Context, is_reassociation: bool) -> Result<Vec<u8>, Error> {
    let rates = ctx.site.current_rates();
    let cap = capability_info(ctx, &rates);

    let mut w = BufferWriter::new(MAX_ASSOC_FRAME_LEN);
    w.append_u16_le(cap.0)?;
    w.append_u16_le(ctx.site.listen_interval())?;

    if is_reassociation {
        let bssid = ctx
            .site
            .previous_bssid()
            .ok_or(Error::BuildFailure("reassociation without a previous BSSID"))?;
        w.append_bytes(&bssid)?;
    }

    let ssid = ctx.site.desired_ssid();
    let ssid = if ssid.is_empty() { ctx.site.current_ssid() } else { ssid };
    ie::write_ssid(&mut w, &ssid)?;

    let rates_writer = ie::RatesWriter::try_new(&rates)?;
    let split = rates_writer.first_ofdm_index();
    if ctx.site.operational_mode() == Dot11Mode::G && split > 0 && split < rates.len() {
        rates_writer.write_split(&mut w)?;
    } else {
        rates_writer.write_all(&mut w)?;
    }

    if cap.spectrum_mgmt() && ctx.site.ap_capabilities().spectrum_mgmt() {
        if let Some(power) = ctx.regulatory.power_capability() {
            ie::write_power_capability(&mut w, power.min_tx_power_dbm, power.max_tx_power_dbm)?;
        }
    }

    if ctx.site.ht_supported() && ctx.sta_cap.ht_enabled() && ht_allowed(ctx) {
        let ht_ie = ctx.sta_cap.ht_capabilities_ie()?;
        w.append_bytes(&ht_ie)?;
    }

    // WSC negotiation and the RSN element are mutually exclusive.
    if !ctx.site.simple_config_active() {
        let rsn_ie = ctx.rsn.info_element()?;
        w.append_bytes(&rsn_ie)?;
    }

    let qos_ies = ctx.qos.build_assoc_ies()?;
    w.append_bytes(&qos_ies)?;

    let vendor_ies = ctx.site.vendor_ies()?;
    w.append_bytes(&vendor_ies)?;

    Ok(w.into_vec())
}

/// Fixed fields and elements of a received association response.
#[derive(Debug, PartialEq)]
pub struct ParsedAssocResponse<'a> {
    pub capabilities: CapabilityInfo,
    pub status: u16,
    pub aid: u16,
    pub ies: &'a [u8],
}

impl<'a> ParsedAssocResponse<'a> {
    /// RSN data extracted by concatenating every RSNE occurrence.
    pub fn rsn_data(&self) -> Option<Vec<u8>> {
        ie::merge_rsn_ies(self.ies, MAX_RSN_IE_LEN)
    }

    pub fn cisco_present(&self) -> bool {
        ie::has_cisco_ie(self.ies)
    }
}

pub fn parse_assoc_response(body: &[u8]) -> Result<ParsedAssocResponse<'_>, FrameParseError> {
    let mut r = BufferReader::new(body);
    let capabilities =
        CapabilityInfo(r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?);
    let status = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    let aid = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    Ok(ParsedAssocResponse { capabilities, status, aid, ies: r.into_remaining() })
}

/// Diagnostic classification of a non-zero association status code. The
/// engine treats all rejections identically; the reason is only logged and
/// forwarded to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssocRejectReason {
    CapabilitiesMismatch,
    ReassociationDenied,
    ApOutOfMemory,
    BasisMismatch,
    StationCapacityExceeded,
    RateMismatch,
    Unspecified,
}

pub fn reject_reason(status: u16) -> AssocRejectReason {
    match status {
        mac::status_code::REFUSED_CAPABILITIES_MISMATCH => AssocRejectReason::CapabilitiesMismatch,
        mac::status_code::REFUSED_EXTERNAL_REASON => AssocRejectReason::ReassociationDenied,
        mac::status_code::REFUSED_AP_OUT_OF_MEMORY => AssocRejectReason::ApOutOfMemory,
        mac::status_code::REFUSED_BASIS_MISMATCH => AssocRejectReason::BasisMismatch,
        mac::status_code::DENIED_NO_MORE_STAS => AssocRejectReason::StationCapacityExceeded,
        mac::status_code::DENIED_RATE_MISMATCH => AssocRejectReason::RateMismatch,
        other => {
            if other != mac::status_code::REFUSED_UNSPECIFIED {
                warn!("association rejected with unmapped status code {}", other);
            }
            AssocRejectReason::Unspecified
        }
    }
}

/// True for rejections the security module must hear about.
pub fn security_related(status: u16) -> bool {
    matches!(
        status,
        mac::status_code::REFUSED_AP_OUT_OF_MEMORY | mac::status_code::REFUSED_BASIS_MISMATCH
    )
}

/// Parsed view over a saved association request body.
#[derive(Debug, PartialEq)]
pub struct ParsedAssocRequest<'a> {
    pub capabilities: CapabilityInfo,
    pub listen_interval: u16,
    pub current_ap_address: Option<MacAddr>,
    pub ies: &'a [u8],
}

pub fn parse_assoc_request(
    body: &[u8],
    is_reassociation: bool,
) -> Result<ParsedAssocRequest<'_>, FrameParseError> {
    let mut r = BufferReader::new(body);
    let capabilities =
        CapabilityInfo(r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?);
    let listen_interval = r.read_u16_le().ok_or(FrameParseError::FrameTooShort)?;
    let current_ap_address = if is_reassociation {
        let bytes = r.read_bytes(6).ok_or(FrameParseError::FrameTooShort)?;
        let mut addr: MacAddr = [0; 6];
        addr.copy_from_slice(bytes);
        Some(addr)
    } else {
        None
    };
    Ok(ParsedAssocRequest { capabilities, listen_interval, current_ap_address, ies: r.into_remaining() })
}
