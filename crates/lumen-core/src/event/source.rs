// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The event-source contract and the polling/waiting entry points.

use super::dispatch::{dispatch_with, HandlerSet};
use super::types::Event;
use crate::error::set_error;
use crate::optional::Optional;
use std::time::Duration;

/// Errors reported by an [`EventSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// Every producer of the source is gone; no event can ever arrive.
    #[error("event source disconnected")]
    Disconnected,
    /// A bounded queue cannot accept another event.
    #[error("event queue is full")]
    QueueFull,
    /// A failure reported by the underlying source.
    #[error("event source error: {0}")]
    Source(String),
}

/// An external producer of tagged events.
///
/// This is the boundary to the native event queue: a non-blocking pop and a
/// blocking wait with an optional timeout.
pub trait EventSource {
    /// Pops one pending event without blocking.
    fn poll_event(&mut self) -> Option<Event>;

    /// Blocks until an event is available.
    fn wait_event(&mut self) -> Result<Event, EventError>;

    /// Blocks until an event is available or `timeout` elapses.
    ///
    /// Returns a disengaged [`Optional`] on timeout.
    fn wait_event_timeout(&mut self, timeout: Duration) -> Result<Optional<Event>, EventError>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn poll_event(&mut self) -> Option<Event> {
        (**self).poll_event()
    }

    fn wait_event(&mut self) -> Result<Event, EventError> {
        (**self).wait_event()
    }

    fn wait_event_timeout(&mut self, timeout: Duration) -> Result<Optional<Event>, EventError> {
        (**self).wait_event_timeout(timeout)
    }
}

/// Pops and discards one pending event. Returns `true` if there was one.
pub fn poll_event<S: EventSource + ?Sized>(source: &mut S) -> bool {
    source.poll_event().is_some()
}

/// Pops one pending event and routes it through `handlers`.
///
/// Returns `true` if an event was pending.
pub fn poll_event_with<S, M>(source: &mut S, mut handlers: impl HandlerSet<M>) -> bool
where
    S: EventSource + ?Sized,
{
    match source.poll_event() {
        Some(event) => {
            dispatch_with(&event, &mut handlers);
            true
        }
        None => false,
    }
}

/// Pops and discards every pending event. Returns how many there were.
pub fn poll_all_events<S: EventSource + ?Sized>(source: &mut S) -> usize {
    let mut count = 0;
    while source.poll_event().is_some() {
        count += 1;
    }
    count
}

/// Pops every pending event, routing each through `handlers`.
///
/// Returns the number of events processed.
pub fn poll_all_events_with<S, M>(source: &mut S, mut handlers: impl HandlerSet<M>) -> usize
where
    S: EventSource + ?Sized,
{
    let mut count = 0;
    while let Some(event) = source.poll_event() {
        dispatch_with(&event, &mut handlers);
        count += 1;
    }
    count
}

/// Blocks the calling thread until an event arrives.
///
/// # Errors
/// Propagates the source's failure, also recording it as the ambient error.
pub fn wait_event<S: EventSource + ?Sized>(source: &mut S) -> Result<Event, EventError> {
    source.wait_event().inspect_err(record)
}

/// Blocks the calling thread until an event arrives or `timeout` elapses.
///
/// The result is engaged if an event arrived in time.
///
/// # Errors
/// Propagates the source's failure, also recording it as the ambient error.
pub fn wait_event_timeout<S: EventSource + ?Sized>(
    source: &mut S,
    timeout: Duration,
) -> Result<Optional<Event>, EventError> {
    source.wait_event_timeout(timeout).inspect_err(record)
}

fn record(error: &EventError) {
    log::error!("Waiting for an event failed: {error}");
    set_error(error.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::types::{EventType, QuitEvent, UserEvent};
    use std::collections::VecDeque;

    /// A scripted source for exercising the entry points.
    struct ScriptedSource {
        pending: VecDeque<Event>,
        connected: bool,
    }

    impl ScriptedSource {
        fn new(events: impl IntoIterator<Item = Event>) -> Self {
            Self {
                pending: events.into_iter().collect(),
                connected: true,
            }
        }
    }

    impl EventSource for ScriptedSource {
        fn poll_event(&mut self) -> Option<Event> {
            self.pending.pop_front()
        }

        fn wait_event(&mut self) -> Result<Event, EventError> {
            self.pending.pop_front().ok_or(EventError::Disconnected)
        }

        fn wait_event_timeout(&mut self, _: Duration) -> Result<Optional<Event>, EventError> {
            if !self.connected {
                return Err(EventError::Disconnected);
            }
            Ok(self.pending.pop_front().into())
        }
    }

    #[test]
    fn poll_reports_presence() {
        let mut source = ScriptedSource::new([Event::quit(1)]);
        assert!(poll_event(&mut source));
        assert!(!poll_event(&mut source));
    }

    #[test]
    fn poll_with_handler_dispatches_one_event() {
        let mut source = ScriptedSource::new([Event::quit(1), Event::quit(2)]);
        let mut stamps = Vec::new();
        let polled = poll_event_with(&mut source, |q: &QuitEvent| {
            stamps.push(q.common.timestamp);
        });
        assert!(polled);
        assert_eq!(stamps, vec![1]);
    }

    #[test]
    fn poll_all_drains_and_counts() {
        let mut source = ScriptedSource::new([
            Event::quit(0),
            Event::user(EventType::USER, 1, 0),
            Event::user(EventType::USER, 2, 0),
        ]);
        let mut codes = Vec::new();
        let mut quits = 0;
        let processed = poll_all_events_with(
            &mut source,
            (
                |u: &UserEvent| codes.push(u.code),
                |_: &QuitEvent| quits += 1,
            ),
        );
        assert_eq!(processed, 3);
        assert_eq!(codes, vec![1, 2]);
        assert_eq!(quits, 1);
        assert_eq!(poll_all_events(&mut source), 0);
    }

    #[test]
    fn timed_wait_is_disengaged_on_timeout() {
        let mut source = ScriptedSource::new([]);
        let result = wait_event_timeout(&mut source, Duration::from_millis(1)).expect("no error");
        assert!(!result.has_value());
    }

    #[test]
    fn wait_failure_sets_ambient_error() {
        let mut source = ScriptedSource::new([]);
        source.connected = false;
        crate::error::clear_error();
        let err = wait_event_timeout(&mut source, Duration::from_millis(1));
        assert_eq!(err, Err(EventError::Disconnected));
        assert_eq!(crate::error::get_error(), "event source disconnected");
    }
}
