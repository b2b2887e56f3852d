// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    std::collections::HashMap,
    std::time::Duration,
};

#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct EventId(u64);

impl EventId {
    pub fn new(id: u64) -> Self {
        EventId(id)
    }
}

/// A scheduler to schedule and cancel timeouts. The platform delivers an
/// expired timeout back to the owner as the `EventId` returned here.
pub trait Scheduler {
    /// Requests to schedule an event. Returns a unique ID used to cancel the
    /// scheduled event.
    fn schedule(&mut self, duration: Duration) -> EventId;
    /// Cancels a previously scheduled event.
    fn cancel(&mut self, id: EventId);
}

/// A timer to schedule and cancel timeouts and retrieve triggered events.
pub struct Timer<E> {
    events: HashMap<EventId, E>,
    scheduler: Box<dyn Scheduler>,
}

impl<E> Timer<E> {
    pub fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self { events: HashMap::default(), scheduler }
    }

    /// Resolves a fired `EventId` to its event. An ID fires at most once;
    /// stale and canceled IDs resolve to `None`.
    pub fn triggered(&mut self, event_id: &EventId) -> Option<E> {
        self.events.remove(event_id)
    }

    pub fn schedule_after(&mut self, duration: Duration, event: E) -> EventId {
        let event_id = self.scheduler.schedule(duration);
        self.events.insert(event_id, event);
        event_id
    }

    pub fn cancel_event(&mut self, event_id: EventId) {
        self.events.remove(&event_id);
        self.scheduler.cancel(event_id);
    }

    pub fn cancel_all(&mut self) {
        for (event_id, _event) in &self.events {
            self.scheduler.cancel(*event_id);
        }
        self.events.clear();
    }
}
