// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Fake collaborators for exercising the session without a driver. All
//! fakes share one state cell; tests keep a `FakeHandle` to configure the
//! collaborators and inspect what the session did.

use {
    super::{Config, Context, MlmeSession},
    crate::{
        device::{
            AuthMode, BssType, CipherSuite, ConnectionSink, Dot11Mode, LinkResult,
            PowerCapability, PreambleType, QosManager, RegulatoryDomain, Rsn, SiteManager,
            StaCapabilities, Transport,
        },
        error::Error,
        mac::{CapabilityInfo, MacAddr, MgmtSubtype},
        timer::{test_utils::FakeScheduler, Timer},
    },
    std::{cell::RefCell, rc::Rc},
};

pub struct FakeState {
    // Collaborator configuration.
    pub auth_mode: AuthMode,
    pub encryption: CipherSuite,
    pub rsn_ie: Vec<u8>,
    pub spectrum_mgmt: bool,
    pub power_capability: Option<PowerCapability>,
    pub ssid: Vec<u8>,
    pub current_ssid: Vec<u8>,
    pub bss_type: BssType,
    pub rates: Vec<u8>,
    pub mode: Dot11Mode,
    pub preamble: PreambleType,
    pub listen_interval: u16,
    pub previous_bssid: Option<MacAddr>,
    pub ap_capabilities: CapabilityInfo,
    pub ap_ht_supported: bool,
    pub simple_config_active: bool,
    pub vendor_ies: Vec<u8>,
    pub wme_enabled: bool,
    pub qos_ies: Vec<u8>,
    pub qos_response_rejected: bool,
    pub ht_enabled: bool,
    pub ht_ie: Vec<u8>,
    // What the session did.
    pub sent_frames: Vec<(MgmtSubtype, Vec<u8>)>,
    pub association_id: Option<u16>,
    pub results: Vec<LinkResult>,
    pub reported_auth_failures: Vec<u16>,
    pub assoc_reports: Vec<(CapabilityInfo, bool)>,
    pub qos_response_ies: Vec<u8>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            auth_mode: AuthMode::Open,
            encryption: CipherSuite::None,
            rsn_ie: Vec::new(),
            spectrum_mgmt: false,
            power_capability: None,
            ssid: b"network".to_vec(),
            current_ssid: b"network".to_vec(),
            bss_type: BssType::Infrastructure,
            rates: vec![2, 4, 11, 22],
            mode: Dot11Mode::G,
            preamble: PreambleType::Long,
            listen_interval: 10,
            previous_bssid: None,
            ap_capabilities: CapabilityInfo(0x0001),
            ap_ht_supported: false,
            simple_config_active: false,
            vendor_ies: Vec::new(),
            wme_enabled: false,
            qos_ies: Vec::new(),
            qos_response_rejected: false,
            ht_enabled: false,
            ht_ie: Vec::new(),
            sent_frames: Vec::new(),
            association_id: None,
            results: Vec::new(),
            reported_auth_failures: Vec::new(),
            assoc_reports: Vec::new(),
            qos_response_ies: Vec::new(),
        }
    }
}

struct FakeCollab(Rc<RefCell<FakeState>>);

impl Transport for FakeCollab {
    fn send_mgmt_frame(&mut self, subtype: MgmtSubtype, body: &[u8]) -> Result<(), Error> {
        self.0.borrow_mut().sent_frames.push((subtype, body.to_vec()));
        Ok(())
    }

    fn set_association_id(&mut self, aid: u16) {
        self.0.borrow_mut().association_id = Some(aid);
    }
}

impl Rsn for FakeCollab {
    fn auth_mode(&self) -> AuthMode {
        self.0.borrow().auth_mode
    }

    fn encryption_status(&self) -> CipherSuite {
        self.0.borrow().encryption
    }

    fn info_element(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.0.borrow().rsn_ie.clone())
    }

    fn report_auth_failure(&mut self, status_code: u16) {
        self.0.borrow_mut().reported_auth_failures.push(status_code);
    }
}

impl RegulatoryDomain for FakeCollab {
    fn spectrum_management_enabled(&self) -> bool {
        self.0.borrow().spectrum_mgmt
    }

    fn power_capability(&self) -> Option<PowerCapability> {
        self.0.borrow().power_capability
    }
}

impl SiteManager for FakeCollab {
    fn desired_ssid(&self) -> Vec<u8> {
        self.0.borrow().ssid.clone()
    }

    fn current_ssid(&self) -> Vec<u8> {
        self.0.borrow().current_ssid.clone()
    }

    fn bss_type(&self) -> BssType {
        self.0.borrow().bss_type
    }

    fn current_rates(&self) -> Vec<u8> {
        self.0.borrow().rates.clone()
    }

    fn operational_mode(&self) -> Dot11Mode {
        self.0.borrow().mode
    }

    fn preamble(&self) -> PreambleType {
        self.0.borrow().preamble
    }

    fn listen_interval(&self) -> u16 {
        self.0.borrow().listen_interval
    }

    fn previous_bssid(&self) -> Option<MacAddr> {
        self.0.borrow().previous_bssid
    }

    fn ap_capabilities(&self) -> CapabilityInfo {
        self.0.borrow().ap_capabilities
    }

    fn ht_supported(&self) -> bool {
        self.0.borrow().ap_ht_supported
    }

    fn simple_config_active(&self) -> bool {
        self.0.borrow().simple_config_active
    }

    fn vendor_ies(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.0.borrow().vendor_ies.clone())
    }

    fn assoc_response_report(&mut self, ap_capabilities: CapabilityInfo, cisco_ap: bool) {
        self.0.borrow_mut().assoc_reports.push((ap_capabilities, cisco_ap));
    }
}

impl QosManager for FakeCollab {
    fn wme_enabled(&self) -> bool {
        self.0.borrow().wme_enabled
    }

    fn build_assoc_ies(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.0.borrow().qos_ies.clone())
    }

    fn handle_assoc_response_ies(&mut self, ies: &[u8]) -> Result<(), Error> {
        if self.0.borrow().qos_response_rejected {
            return Err(Error::BuildFailure("qos"));
        }
        self.0.borrow_mut().qos_response_ies = ies.to_vec();
        Ok(())
    }
}

impl StaCapabilities for FakeCollab {
    fn ht_enabled(&self) -> bool {
        self.0.borrow().ht_enabled
    }

    fn ht_capabilities_ie(&mut self) -> Result<Vec<u8>, Error> {
        Ok(self.0.borrow().ht_ie.clone())
    }
}

impl ConnectionSink for FakeCollab {
    fn on_link_result(&mut self, result: LinkResult) {
        self.0.borrow_mut().results.push(result);
    }
}

/// Configures the fakes and inspects what the session did with them.
pub struct FakeHandle {
    state: Rc<RefCell<FakeState>>,
    pub scheduler: FakeScheduler,
}

impl FakeHandle {
    pub fn set_auth_mode(&self, mode: AuthMode) {
        self.state.borrow_mut().auth_mode = mode;
    }

    pub fn set_encryption(&self, cipher: CipherSuite) {
        self.state.borrow_mut().encryption = cipher;
    }

    pub fn set_rsn_ie(&self, ie: Vec<u8>) {
        self.state.borrow_mut().rsn_ie = ie;
    }

    pub fn set_spectrum_mgmt(&self, enabled: bool) {
        self.state.borrow_mut().spectrum_mgmt = enabled;
    }

    pub fn set_power_capability(&self, power: Option<PowerCapability>) {
        self.state.borrow_mut().power_capability = power;
    }

    pub fn set_ssid(&self, ssid: &[u8]) {
        self.state.borrow_mut().ssid = ssid.to_vec();
    }

    pub fn set_rates(&self, rates: Vec<u8>) {
        self.state.borrow_mut().rates = rates;
    }

    pub fn set_mode(&self, mode: Dot11Mode) {
        self.state.borrow_mut().mode = mode;
    }

    pub fn set_preamble(&self, preamble: PreambleType) {
        self.state.borrow_mut().preamble = preamble;
    }

    pub fn set_listen_interval(&self, interval: u16) {
        self.state.borrow_mut().listen_interval = interval;
    }

    pub fn set_previous_bssid(&self, bssid: Option<MacAddr>) {
        self.state.borrow_mut().previous_bssid = bssid;
    }

    pub fn set_ap_capabilities(&self, caps: CapabilityInfo) {
        self.state.borrow_mut().ap_capabilities = caps;
    }

    pub fn set_ap_ht_supported(&self, supported: bool) {
        self.state.borrow_mut().ap_ht_supported = supported;
    }

    pub fn set_simple_config_active(&self, active: bool) {
        self.state.borrow_mut().simple_config_active = active;
    }

    pub fn set_vendor_ies(&self, ies: Vec<u8>) {
        self.state.borrow_mut().vendor_ies = ies;
    }

    pub fn set_wme_enabled(&self, enabled: bool) {
        self.state.borrow_mut().wme_enabled = enabled;
    }

    pub fn set_qos_ies(&self, ies: Vec<u8>) {
        self.state.borrow_mut().qos_ies = ies;
    }

    pub fn set_qos_response_rejected(&self, rejected: bool) {
        self.state.borrow_mut().qos_response_rejected = rejected;
    }

    pub fn set_ht_enabled(&self, enabled: bool) {
        self.state.borrow_mut().ht_enabled = enabled;
    }

    pub fn set_ht_ie(&self, ie: Vec<u8>) {
        self.state.borrow_mut().ht_ie = ie;
    }

    pub fn sent_frames(&self) -> Vec<(MgmtSubtype, Vec<u8>)> {
        self.state.borrow().sent_frames.clone()
    }

    pub fn results(&self) -> Vec<LinkResult> {
        self.state.borrow().results.clone()
    }

    pub fn association_id(&self) -> Option<u16> {
        self.state.borrow().association_id
    }

    pub fn reported_auth_failures(&self) -> Vec<u16> {
        self.state.borrow().reported_auth_failures.clone()
    }

    pub fn assoc_reports(&self) -> Vec<(CapabilityInfo, bool)> {
        self.state.borrow().assoc_reports.clone()
    }

    pub fn qos_response_ies(&self) -> Vec<u8> {
        self.state.borrow().qos_response_ies.clone()
    }
}

pub fn fake_context() -> (Context, FakeHandle) {
    let state = Rc::new(RefCell::new(FakeState::default()));
    let scheduler = FakeScheduler::new();
    let ctx = Context {
        transport: Box::new(FakeCollab(state.clone())),
        rsn: Box::new(FakeCollab(state.clone())),
        regulatory: Box::new(FakeCollab(state.clone())),
        site: Box::new(FakeCollab(state.clone())),
        qos: Box::new(FakeCollab(state.clone())),
        sta_cap: Box::new(FakeCollab(state.clone())),
        sink: Box::new(FakeCollab(state.clone())),
        timer: Timer::new(Box::new(scheduler.clone())),
    };
    (ctx, FakeHandle { state, scheduler })
}

pub fn fake_session() -> (MlmeSession, FakeHandle) {
    let (ctx, handle) = fake_context();
    (MlmeSession::new(ctx, Config::default()), handle)
}
