// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Wire-level constants and fixed fields of 802.11 management frames, limited
//! to what the link-establishment exchange needs.

use bitfield::bitfield;

pub type MacAddr = [u8; 6];

/// Management frame subtypes handed to the transport for transmission.
/// IEEE Std 802.11-2016, 9.2.4.1.3, Table 9-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MgmtSubtype {
    AssocReq,
    ReassocReq,
    Auth,
}

impl MgmtSubtype {
    pub fn to_u8(self) -> u8 {
        match self {
            MgmtSubtype::AssocReq => 0b0000,
            MgmtSubtype::ReassocReq => 0b0010,
            MgmtSubtype::Auth => 0b1011,
        }
    }
}

/// IEEE Std 802.11-2016, 9.4.1.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AuthAlgorithmNumber {
    OpenSystem = 0,
    SharedKey = 1,
}

// IEEE Std 802.11-2016, 9.4.1.9, Table 9-46 (the subset the engine reacts to)
pub mod status_code {
    pub const SUCCESS: u16 = 0;
    pub const REFUSED_UNSPECIFIED: u16 = 1;
    pub const REFUSED_CAPABILITIES_MISMATCH: u16 = 10;
    pub const REFUSED_EXTERNAL_REASON: u16 = 11;
    pub const REFUSED_AP_OUT_OF_MEMORY: u16 = 12;
    pub const REFUSED_BASIS_MISMATCH: u16 = 13;
    pub const DENIED_NO_MORE_STAS: u16 = 17;
    pub const DENIED_RATE_MISMATCH: u16 = 18;
}

bitfield! {
    /// IEEE Std 802.11-2016, 9.4.1.4
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct CapabilityInfo(u16);
    impl Debug;
    pub ess, set_ess: 0;
    pub ibss, set_ibss: 1;
    pub cf_pollable, set_cf_pollable: 2;
    pub cf_poll_req, set_cf_poll_req: 3;
    pub privacy, set_privacy: 4;
    pub short_preamble, set_short_preamble: 5;
    pub pbcc, set_pbcc: 6;
    pub channel_agility, set_channel_agility: 7;
    pub spectrum_mgmt, set_spectrum_mgmt: 8;
    pub qos, set_qos: 9;
    pub short_slot_time, set_short_slot_time: 10;
    pub apsd, set_apsd: 11;
    pub radio_measurement, set_radio_measurement: 12;
    pub dsss_ofdm, set_dsss_ofdm: 13;
    pub delayed_block_ack, set_delayed_block_ack: 14;
    pub immediate_block_ack, set_immediate_block_ack: 15;
}

/// Rate values are in units of 500 kbit/s; the MSB marks a BSS basic rate.
pub const RATE_BASIC_BIT: u8 = 0x80;

/// 22 Mbit/s PBCC rate, IEEE Std 802.11-2016, 16.2.3.
pub const RATE_PBCC_22MBPS: u8 = 44;

/// Returns true for the ERP-OFDM rates (6-54 Mbit/s), with the basic-rate
/// bit ignored. IEEE Std 802.11-2016, 17.3.
pub fn is_ofdm_rate(rate: u8) -> bool {
    matches!(rate & !RATE_BASIC_BIT, 12 | 18 | 24 | 36 | 48 | 72 | 96 | 108)
}
