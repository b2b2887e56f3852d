// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The link-establishment state machine: four states, eight events, one
//! exhaustive transition table. The table only decides; side effects are
//! carried out by the session when it executes the returned `Action`.

use crate::device::LinkFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    AuthWait,
    SharedWait,
    AssocWait,
}

/// Discrete inputs to the state machine: owner requests, decoded frame
/// outcomes, and timer expiries.
#[derive(Debug, PartialEq)]
pub enum MlmeEvent {
    Start,
    Stop,
    Fail(LinkFailure),
    Success,
    SharedChallengeReceived { challenge: Vec<u8> },
    AuthTimeout,
    SharedTimeout,
    AssocTimeout,
}

/// What the session must do as part of a transition.
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    /// Send the first authentication frame and arm the auth timer.
    StartAuth,
    /// Echo the challenge back as shared-key message 3.
    SendChallengeResponse { challenge: Vec<u8> },
    /// Resend the last auth frame or fail on retry exhaustion.
    RetryAuth,
    RetryShared,
    RetryAssoc,
    /// Build and send the (re)association request.
    SendAssocRequest,
    /// Terminal: the link is established.
    ReportSuccess,
    /// Terminal: owner-requested teardown.
    HandleStop,
    /// Terminal unless the auto-switch fallback applies.
    HandleFail(LinkFailure),
    /// Logic-error catch-all; must not fire in correct operation.
    Unexpected,
}

/// The transition table. Consumes the event so payload-carrying events hand
/// their data to the action.
pub fn transition(state: State, event: MlmeEvent) -> (State, Action) {
    match (state, event) {
        (State::Idle, MlmeEvent::Start) => (State::AuthWait, Action::StartAuth),
        // Stopping an idle session is a no-op; stop is idempotent.
        (State::Idle, MlmeEvent::Stop) => (State::Idle, Action::None),

        (State::AuthWait, MlmeEvent::Success) => (State::AssocWait, Action::SendAssocRequest),
        (State::AuthWait, MlmeEvent::SharedChallengeReceived { challenge }) => {
            (State::SharedWait, Action::SendChallengeResponse { challenge })
        }
        (State::AuthWait, MlmeEvent::AuthTimeout) | (State::AuthWait, MlmeEvent::SharedTimeout) => {
            (State::AuthWait, Action::RetryAuth)
        }

        (State::SharedWait, MlmeEvent::Success) => (State::AssocWait, Action::SendAssocRequest),
        (State::SharedWait, MlmeEvent::AuthTimeout)
        | (State::SharedWait, MlmeEvent::SharedTimeout) => {
            (State::SharedWait, Action::RetryShared)
        }

        (State::AssocWait, MlmeEvent::Success) => (State::Idle, Action::ReportSuccess),
        (State::AssocWait, MlmeEvent::AssocTimeout) => (State::AssocWait, Action::RetryAssoc),

        (State::AuthWait, MlmeEvent::Stop)
        | (State::SharedWait, MlmeEvent::Stop)
        | (State::AssocWait, MlmeEvent::Stop) => (State::Idle, Action::HandleStop),

        (State::AuthWait, MlmeEvent::Fail(failure))
        | (State::SharedWait, MlmeEvent::Fail(failure))
        | (State::AssocWait, MlmeEvent::Fail(failure)) => {
            (State::Idle, Action::HandleFail(failure))
        }

        (_, _) => (State::Idle, Action::Unexpected),
    }
}
