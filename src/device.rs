// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Seams between the link-establishment engine and the rest of the driver.
//! Each collaborator the engine consults while building frames or reporting
//! results is a trait so tests can substitute fakes.

use crate::{
    error::Error,
    mac::{CapabilityInfo, MacAddr, MgmtSubtype},
};

/// Authentication policy configured for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Open,
    SharedKey,
    /// Try Shared Key first; fall back to Open once if the AP rejects it.
    AutoSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    None,
    Wep40,
    Wep104,
    Tkip,
    Ccmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BssType {
    Infrastructure,
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreambleType {
    Short,
    Long,
}

/// PHY operating mode of the target BSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dot11Mode {
    B,
    G,
    A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    FirstConnection,
    Roam,
}

/// How an in-progress link establishment was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectType {
    Deauthenticate,
    Disassociate,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCapability {
    pub min_tx_power_dbm: u8,
    pub max_tx_power_dbm: u8,
}

/// Terminal outcome of a link establishment attempt, reported exactly once
/// per `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkResult {
    Established,
    Stopped,
    Failed(LinkFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFailure {
    /// AP answered an authentication frame with a non-zero status code.
    AuthRejected(u16),
    /// AP answered an association request with a non-zero status code.
    AssocRejected(u16),
    RetriesExhausted,
    /// A management frame could not be constructed.
    BuildFailure,
    Unspecified,
}

/// Hands finished management frame bodies to the driver for transmission.
pub trait Transport {
    fn send_mgmt_frame(&mut self, subtype: MgmtSubtype, body: &[u8]) -> Result<(), Error>;
    /// Publishes the association ID from a successful association response.
    fn set_association_id(&mut self, aid: u16);
}

/// Security module: authentication policy, cipher configuration, and the
/// security element carried in (re)association requests.
pub trait Rsn {
    fn auth_mode(&self) -> AuthMode;
    fn encryption_status(&self) -> CipherSuite;
    /// The RSN element(s) to append to an association request, element
    /// headers included. Empty when the connection carries no RSN element.
    fn info_element(&mut self) -> Result<Vec<u8>, Error>;
    /// Notifies the security module that the AP refused association for a
    /// security-related reason (out of memory or basis mismatch).
    fn report_auth_failure(&mut self, status_code: u16);
}

/// Regulatory state consulted for the spectrum management capability and the
/// Power Capability element.
pub trait RegulatoryDomain {
    fn spectrum_management_enabled(&self) -> bool;
    /// Present only when spectrum management is enabled.
    fn power_capability(&self) -> Option<PowerCapability>;
}

/// Connection bookkeeping owned by the driver: the target BSS and the
/// station's negotiated parameters.
pub trait SiteManager {
    fn desired_ssid(&self) -> Vec<u8>;
    /// SSID of the currently associated BSS, used when the desired SSID is
    /// the wildcard (empty) SSID.
    fn current_ssid(&self) -> Vec<u8>;
    fn bss_type(&self) -> BssType;
    /// Rate set to advertise, sorted ascending, basic-rate bits included.
    fn current_rates(&self) -> Vec<u8>;
    fn operational_mode(&self) -> Dot11Mode;
    fn preamble(&self) -> PreambleType;
    fn listen_interval(&self) -> u16;
    /// BSSID of the previous AP, present only when roaming.
    fn previous_bssid(&self) -> Option<MacAddr>;
    /// Capabilities advertised by the target AP's beacon.
    fn ap_capabilities(&self) -> CapabilityInfo;
    /// True if the target AP advertises HT operation.
    fn ht_supported(&self) -> bool;
    fn simple_config_active(&self) -> bool;
    /// Vendor-specific element(s) for an association request, headers
    /// included. Empty when none are configured.
    fn vendor_ies(&mut self) -> Result<Vec<u8>, Error>;
    /// Reports the capabilities and vendor fingerprint of a successful
    /// association response back to the driver.
    fn assoc_response_report(&mut self, ap_capabilities: CapabilityInfo, cisco_ap: bool);
}

/// QoS (WME) negotiation.
pub trait QosManager {
    fn wme_enabled(&self) -> bool;
    /// The WME element(s) for an association request, headers included.
    fn build_assoc_ies(&mut self) -> Result<Vec<u8>, Error>;
    /// Parses the QoS-relevant elements of a successful association response.
    fn handle_assoc_response_ies(&mut self, ies: &[u8]) -> Result<(), Error>;
}

/// HT capability of the station.
pub trait StaCapabilities {
    fn ht_enabled(&self) -> bool;
    /// The HT Capabilities element, header included.
    fn ht_capabilities_ie(&mut self) -> Result<Vec<u8>, Error>;
}

/// Receives the terminal result of the exchange and supplies caller-provided
/// vendor elements for the association request.
pub trait ConnectionSink {
    fn on_link_result(&mut self, result: LinkResult);
}
