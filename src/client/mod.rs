// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Client-side MLME link establishment: one `MlmeSession` drives the
//! authentication and association exchange with an AP and reports a single
//! terminal result to the owning connection manager.

mod assoc;
mod auth;
mod state;
#[cfg(test)]
pub mod test_utils;

use {
    crate::{
        device::{
            AuthMode, ConnectionKind, ConnectionSink, DisconnectType, LinkFailure, LinkResult,
            QosManager, RegulatoryDomain, Rsn, SiteManager, StaCapabilities, Transport,
        },
        error::FrameWriteError,
        mac::{status_code, AuthAlgorithmNumber, MgmtSubtype},
        timer::{EventId, Timer},
        MAX_ASSOC_FRAME_LEN, MAX_EXTRA_IES_LEN,
    },
    log::{debug, error, info, warn},
    std::time::Duration,
};

pub use self::{
    assoc::{AssocPhase, AssocRejectReason, ParsedAssocRequest, ParsedAssocResponse},
    auth::AuthPhase,
    state::State,
};

use self::state::{Action, MlmeEvent};

/// Timeout tokens delivered back through `MlmeSession::on_timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEvent {
    Authenticating,
    ChallengeResponse,
    Associating,
}

/// Everything the session consults or drives in the surrounding driver.
pub struct Context {
    pub transport: Box<dyn Transport>,
    pub rsn: Box<dyn Rsn>,
    pub regulatory: Box<dyn RegulatoryDomain>,
    pub site: Box<dyn SiteManager>,
    pub qos: Box<dyn QosManager>,
    pub sta_cap: Box<dyn StaCapabilities>,
    pub sink: Box<dyn ConnectionSink>,
    pub timer: Timer<TimedEvent>,
}

/// Response timeouts and retry bounds per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub auth_timeout: Duration,
    pub auth_max_retries: u32,
    pub assoc_timeout: Duration,
    pub assoc_max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_timeout: Duration::from_millis(500),
            auth_max_retries: 3,
            assoc_timeout: Duration::from_millis(2000),
            assoc_max_retries: 2,
        }
    }
}

/// Diagnostic counters accumulated over the lifetime of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub auth_rejects: u64,
    pub auth_timeouts: u64,
    pub assoc_rejects: u64,
    pub assoc_timeouts: u64,
    pub unexpected_events: u64,
}

/// Parsed view over the saved request/response pair of a completed
/// association exchange.
#[derive(Debug)]
pub struct AssociationInformation<'a> {
    pub request: ParsedAssocRequest<'a>,
    pub response: ParsedAssocResponse<'a>,
}

/// One link-establishment attempt: authentication, the optional shared-key
/// challenge exchange, then association. Driven entirely by discrete events
/// (owner calls, received frames, timer expiries); non-reentrant.
pub struct MlmeSession {
    ctx: Context,
    config: Config,
    state: State,
    auth: AuthPhase,
    assoc: AssocPhase,
    /// Mode configured for this attempt; `AutoSwitch` starts as shared key.
    configured_auth_mode: AuthMode,
    /// Set once the shared-to-open fallback has been taken.
    legacy_auto_switch_used: bool,
    /// Caller-provided elements (FT/RSN) appended to authentication frames.
    extra_ies: Vec<u8>,
    /// The single armed timeout, if any.
    active_timeout: Option<EventId>,
    /// True between `start` and the terminal report; guards the
    /// one-report-per-attempt guarantee.
    attempt_active: bool,
    unexpected_events: u64,
    last_disconnect: Option<(DisconnectType, u16)>,
}

impl MlmeSession {
    pub fn new(ctx: Context, config: Config) -> Self {
        Self {
            ctx,
            config,
            state: State::Idle,
            auth: AuthPhase::new(),
            assoc: AssocPhase::new(),
            configured_auth_mode: AuthMode::Open,
            legacy_auto_switch_used: false,
            extra_ies: Vec::new(),
            active_timeout: None,
            attempt_active: false,
            unexpected_events: 0,
            last_disconnect: None,
        }
    }

    /// Begins a link attempt. The authentication algorithm is taken from the
    /// security module; a roam selects the Reassociation Request subtype.
    pub fn start(&mut self, kind: ConnectionKind) {
        if self.state == State::Idle {
            self.configured_auth_mode = self.ctx.rsn.auth_mode();
            self.legacy_auto_switch_used = false;
            self.attempt_active = true;
            self.last_disconnect = None;
            self.auth = AuthPhase::new();
            self.assoc = AssocPhase::new();
            self.auth.algorithm = match self.configured_auth_mode {
                AuthMode::Open => AuthAlgorithmNumber::OpenSystem,
                AuthMode::SharedKey | AuthMode::AutoSwitch => AuthAlgorithmNumber::SharedKey,
            };
            self.assoc.is_reassociation = kind == ConnectionKind::Roam;
        }
        self.process(MlmeEvent::Start);
    }

    /// Tears the attempt down. Stopping an idle session is a no-op.
    pub fn stop(&mut self, disconnect_type: DisconnectType, reason: u16) {
        self.last_disconnect = Some((disconnect_type, reason));
        if self.state == State::AssocWait && disconnect_type == DisconnectType::Disassociate {
            // The driver still owes the AP a disassociation frame.
            self.assoc.disassociate_pending = true;
        }
        self.process(MlmeEvent::Stop);
    }

    /// Feeds a received authentication frame body into the exchange.
    /// Malformed frames and frames whose algorithm does not match the one in
    /// flight are dropped without a state change.
    pub fn on_auth_frame(&mut self, body: &[u8]) {
        let frame = match auth::parse_auth_frame(body) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping malformed auth frame: {}", e);
                return;
            }
        };
        if !matches!(self.state, State::AuthWait | State::SharedWait) {
            debug!("dropping auth frame outside an authentication exchange");
            return;
        }
        if frame.algorithm != self.auth.algorithm as u16 {
            warn!(
                "dropping auth frame with algorithm {} while {} is in flight",
                frame.algorithm, self.auth.algorithm as u16
            );
            return;
        }
        let event = match (self.state, frame.sequence) {
            (State::AuthWait, auth::AUTH_SEQ_RESPONSE) => {
                if frame.status != status_code::SUCCESS {
                    self.auth.reject_count += 1;
                    MlmeEvent::Fail(LinkFailure::AuthRejected(frame.status))
                } else {
                    match self.auth.algorithm {
                        AuthAlgorithmNumber::OpenSystem => MlmeEvent::Success,
                        AuthAlgorithmNumber::SharedKey => match frame.challenge {
                            Some(challenge) => MlmeEvent::SharedChallengeReceived {
                                challenge: challenge.to_vec(),
                            },
                            None => {
                                warn!("dropping shared key response without challenge text");
                                return;
                            }
                        },
                    }
                }
            }
            (State::SharedWait, auth::AUTH_SEQ_CONFIRM) => {
                if frame.status != status_code::SUCCESS {
                    self.auth.reject_count += 1;
                    MlmeEvent::Fail(LinkFailure::AuthRejected(frame.status))
                } else {
                    MlmeEvent::Success
                }
            }
            (_, seq) => {
                warn!("dropping auth frame with unexpected sequence number {}", seq);
                return;
            }
        };
        self.process(event);
    }

    /// Feeds a received association response body into the exchange.
    pub fn on_assoc_frame(&mut self, body: &[u8]) {
        if self.state != State::AssocWait {
            debug!("dropping association response outside an association exchange");
            return;
        }
        let frame = match assoc::parse_assoc_response(body) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping malformed association response: {}", e);
                return;
            }
        };
        if body.len() <= MAX_ASSOC_FRAME_LEN {
            self.assoc.response_buffer = body.to_vec();
        } else {
            warn!("not retaining an association response of {} bytes", body.len());
        }
        let event = if frame.status == status_code::SUCCESS {
            self.ctx.transport.set_association_id(frame.aid);
            self.ctx.site.assoc_response_report(frame.capabilities, frame.cisco_present());
            if let Err(e) = self.ctx.qos.handle_assoc_response_ies(frame.ies) {
                error!("QoS rejected association response elements: {}", e);
                self.process(MlmeEvent::Fail(LinkFailure::Unspecified));
                return;
            }
            MlmeEvent::Success
        } else {
            self.assoc.reject_count += 1;
            info!(
                "association rejected: {:?} (status {})",
                assoc::reject_reason(frame.status),
                frame.status
            );
            if assoc::security_related(frame.status) {
                self.ctx.rsn.report_auth_failure(frame.status);
            }
            MlmeEvent::Fail(LinkFailure::AssocRejected(frame.status))
        };
        self.process(event);
    }

    /// Resolves a fired timeout. Stale and canceled tokens are ignored.
    pub fn on_timeout(&mut self, event_id: EventId) {
        let event = match self.ctx.timer.triggered(&event_id) {
            Some(TimedEvent::Authenticating) => MlmeEvent::AuthTimeout,
            Some(TimedEvent::ChallengeResponse) => MlmeEvent::SharedTimeout,
            Some(TimedEvent::Associating) => MlmeEvent::AssocTimeout,
            None => return,
        };
        if self.active_timeout == Some(event_id) {
            self.active_timeout = None;
        }
        self.process(event);
    }

    /// Replaces the caller-provided element blob appended to authentication
    /// frames. Cleared automatically when the exchange leaves a wait state.
    pub fn set_extra_ies(&mut self, ies: &[u8]) -> Result<(), FrameWriteError> {
        if ies.len() > MAX_EXTRA_IES_LEN {
            return Err(FrameWriteError::BufferTooSmall);
        }
        self.extra_ies.clear();
        self.extra_ies.extend_from_slice(ies);
        Ok(())
    }

    /// Last association request sent, for downstream consumers such as key
    /// exchange.
    pub fn association_request(&self) -> Option<&[u8]> {
        if self.assoc.request_buffer.is_empty() {
            None
        } else {
            Some(&self.assoc.request_buffer)
        }
    }

    /// Last association response received.
    pub fn association_response(&self) -> Option<&[u8]> {
        if self.assoc.response_buffer.is_empty() {
            None
        } else {
            Some(&self.assoc.response_buffer)
        }
    }

    /// Parsed view over the saved association exchange, once both sides of
    /// it have been seen.
    pub fn association_information(&self) -> Option<AssociationInformation<'_>> {
        let request =
            assoc::parse_assoc_request(self.association_request()?, self.assoc.is_reassociation)
                .ok()?;
        let response = assoc::parse_assoc_response(self.association_response()?).ok()?;
        Some(AssociationInformation { request, response })
    }

    pub fn counters(&self) -> Counters {
        Counters {
            auth_rejects: self.auth.reject_count,
            auth_timeouts: self.auth.timeout_count,
            assoc_rejects: self.assoc.reject_count,
            assoc_timeouts: self.assoc.timeout_count,
            unexpected_events: self.unexpected_events,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Disconnect type and reason recorded by the last `stop`.
    pub fn last_disconnect(&self) -> Option<(DisconnectType, u16)> {
        self.last_disconnect
    }

    /// True when a stop interrupted an association exchange with a
    /// disassociation still owed to the AP.
    pub fn disassociate_pending(&self) -> bool {
        self.assoc.disassociate_pending
    }

    /// Runs the state machine until the event chain is exhausted. Actions
    /// may produce follow-up events (retry exhaustion, the auto-switch
    /// fallback), which are processed in order before returning.
    fn process(&mut self, event: MlmeEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            next = self.step(event);
        }
    }

    fn step(&mut self, event: MlmeEvent) -> Option<MlmeEvent> {
        let (next_state, action) = state::transition(self.state, event);
        self.state = next_state;
        match action {
            Action::None => None,
            Action::StartAuth => self.start_auth(),
            Action::SendChallengeResponse { challenge } => self.send_challenge_response(challenge),
            Action::RetryAuth => self.retry_auth(TimedEvent::Authenticating),
            Action::RetryShared => self.retry_auth(TimedEvent::ChallengeResponse),
            Action::RetryAssoc => self.retry_assoc(),
            Action::SendAssocRequest => self.send_assoc_request(),
            Action::ReportSuccess => {
                self.finish(LinkResult::Established);
                None
            }
            Action::HandleStop => {
                self.finish(LinkResult::Stopped);
                None
            }
            Action::HandleFail(failure) => self.handle_fail(failure),
            Action::Unexpected => {
                self.handle_unexpected();
                None
            }
        }
    }

    fn arm_timer(&mut self, duration: Duration, event: TimedEvent) {
        self.cancel_timer();
        self.active_timeout = Some(self.ctx.timer.schedule_after(duration, event));
    }

    fn cancel_timer(&mut self) {
        if let Some(event_id) = self.active_timeout.take() {
            self.ctx.timer.cancel_event(event_id);
        }
    }

    fn start_auth(&mut self) -> Option<MlmeEvent> {
        let frame = match auth::write_auth_frame(
            self.auth.algorithm,
            auth::AUTH_SEQ_REQUEST,
            status_code::SUCCESS,
            &self.extra_ies,
        ) {
            Ok(frame) => frame,
            Err(e) => {
                error!("failed to build auth frame: {}", e);
                return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
            }
        };
        if let Err(e) = self.ctx.transport.send_mgmt_frame(MgmtSubtype::Auth, &frame) {
            error!("failed to send auth frame: {}", e);
            return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
        }
        self.auth.last_frame = frame;
        self.arm_timer(self.config.auth_timeout, TimedEvent::Authenticating);
        None
    }

    fn send_challenge_response(&mut self, challenge: Vec<u8>) -> Option<MlmeEvent> {
        self.cancel_timer();
        let frame = match auth::write_challenge_response(&challenge) {
            Ok(frame) => frame,
            Err(e) => {
                error!("failed to build challenge response: {}", e);
                return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
            }
        };
        self.auth.challenge = Some(challenge);
        // The challenge exchange retries independently of the first message.
        self.auth.retry_count = 0;
        if let Err(e) = self.ctx.transport.send_mgmt_frame(MgmtSubtype::Auth, &frame) {
            error!("failed to send challenge response: {}", e);
            return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
        }
        self.auth.last_frame = frame;
        self.arm_timer(self.config.auth_timeout, TimedEvent::ChallengeResponse);
        None
    }

    fn retry_auth(&mut self, event: TimedEvent) -> Option<MlmeEvent> {
        self.auth.timeout_count += 1;
        if self.auth.retry_count >= self.config.auth_max_retries {
            return Some(MlmeEvent::Fail(LinkFailure::RetriesExhausted));
        }
        self.auth.retry_count += 1;
        if let Err(e) = self.ctx.transport.send_mgmt_frame(MgmtSubtype::Auth, &self.auth.last_frame)
        {
            error!("failed to resend auth frame: {}", e);
            return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
        }
        self.arm_timer(self.config.auth_timeout, event);
        None
    }

    fn retry_assoc(&mut self) -> Option<MlmeEvent> {
        self.assoc.timeout_count += 1;
        if self.assoc.retry_count >= self.config.assoc_max_retries {
            return Some(MlmeEvent::Fail(LinkFailure::RetriesExhausted));
        }
        self.assoc.retry_count += 1;
        let subtype = self.assoc_subtype();
        if let Err(e) = self.ctx.transport.send_mgmt_frame(subtype, &self.assoc.request_buffer) {
            error!("failed to resend association request: {}", e);
            return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
        }
        self.arm_timer(self.config.assoc_timeout, TimedEvent::Associating);
        None
    }

    fn send_assoc_request(&mut self) -> Option<MlmeEvent> {
        self.cancel_timer();
        self.extra_ies.clear();
        self.assoc.retry_count = 0;
        let frame = match assoc::build_assoc_request(&mut self.ctx, self.assoc.is_reassociation) {
            Ok(frame) => frame,
            Err(e) => {
                error!("failed to build association request: {}", e);
                return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
            }
        };
        let subtype = self.assoc_subtype();
        if let Err(e) = self.ctx.transport.send_mgmt_frame(subtype, &frame) {
            error!("failed to send association request: {}", e);
            return Some(MlmeEvent::Fail(LinkFailure::BuildFailure));
        }
        self.assoc.request_buffer = frame;
        self.arm_timer(self.config.assoc_timeout, TimedEvent::Associating);
        None
    }

    fn assoc_subtype(&self) -> MgmtSubtype {
        if self.assoc.is_reassociation {
            MgmtSubtype::ReassocReq
        } else {
            MgmtSubtype::AssocReq
        }
    }

    fn handle_fail(&mut self, failure: LinkFailure) -> Option<MlmeEvent> {
        self.cancel_timer();
        let fallback = self.configured_auth_mode == AuthMode::AutoSwitch
            && !self.legacy_auto_switch_used
            && matches!(failure, LinkFailure::AuthRejected(_));
        if fallback {
            // Retry the whole exchange as open auth, invisibly to the owner.
            self.legacy_auto_switch_used = true;
            self.auth.restart(AuthAlgorithmNumber::OpenSystem);
            info!("shared key authentication rejected; retrying as open");
            return Some(MlmeEvent::Start);
        }
        self.finish(LinkResult::Failed(failure));
        None
    }

    fn finish(&mut self, result: LinkResult) {
        self.cancel_timer();
        self.extra_ies.clear();
        if self.attempt_active {
            self.attempt_active = false;
            self.ctx.sink.on_link_result(result);
        }
    }

    fn handle_unexpected(&mut self) {
        self.unexpected_events += 1;
        error!("unexpected event for the current state; resetting the exchange");
        self.ctx.timer.cancel_all();
        self.active_timeout = None;
        self.finish(LinkResult::Failed(LinkFailure::Unspecified));
    }
}
