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

//! A thread-safe event queue that acts as the application's [`EventSource`].

use flume::{RecvTimeoutError, TrySendError};
use lumen_core::error::set_error;
use lumen_core::event::{Event, EventError, EventSource, EventType};
use lumen_core::{LumenSettings, Optional};
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Manages the channel that platform translators and other threads push
/// events into, and that the dispatch loop pops from.
///
/// Events kept by a flush move out of the channel into `held`, which is
/// always served before the channel. They never go back through the
/// sender, so concurrent producers cannot take their place.
#[derive(Debug)]
pub struct EventQueue {
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
    held: Mutex<VecDeque<Event>>,
    next_user: AtomicU32,
    started: Instant,
}

impl EventQueue {
    /// Creates a queue with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!("Event queue initialized (unbounded).");
        Self::from_channel(sender, receiver)
    }

    /// Creates a queue that holds at most `capacity` pending events.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity);
        log::info!("Event queue initialized (capacity {capacity}).");
        Self::from_channel(sender, receiver)
    }

    /// Creates a queue sized by [`LumenSettings::event_queue_capacity`].
    pub fn from_settings(settings: &LumenSettings) -> Self {
        match settings.event_queue_capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::new(),
        }
    }

    fn from_channel(sender: flume::Sender<Event>, receiver: flume::Receiver<Event>) -> Self {
        Self {
            sender,
            receiver,
            held: Mutex::new(VecDeque::new()),
            next_user: AtomicU32::new(EventType::USER.raw()),
            started: Instant::now(),
        }
    }

    /// Milliseconds since the queue was created, saturating at `u32::MAX`.
    ///
    /// Used as the timestamp of events produced by platform translators.
    pub fn ticks(&self) -> u32 {
        u32::try_from(self.started.elapsed().as_millis()).unwrap_or(u32::MAX)
    }

    /// Appends an event to the queue.
    ///
    /// # Errors
    /// [`EventError::QueueFull`] when a bounded queue has no room. The error
    /// is also recorded as the ambient error string.
    pub fn push_event(&self, event: impl Into<Event>) -> Result<(), EventError> {
        let event = event.into();
        log::trace!("Pushing event {:?}.", event.event_type());
        self.sender.try_send(event).map_err(|err| {
            let error = match err {
                TrySendError::Full(_) => EventError::QueueFull,
                TrySendError::Disconnected(_) => EventError::Disconnected,
            };
            log::warn!("Failed to push event: {error}");
            set_error(error.to_string());
            error
        })
    }

    /// Returns a clone of the sender end of the channel.
    /// Use this to feed the queue from other threads.
    pub fn sender(&self) -> flume::Sender<Event> {
        self.sender.clone()
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.held().len() + self.receiver.len()
    }

    /// Returns `true` if no event is pending.
    pub fn is_empty(&self) -> bool {
        self.held().is_empty() && self.receiver.is_empty()
    }

    fn held(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn held_mut(&mut self) -> &mut VecDeque<Event> {
        self.held.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes every pending event of discriminant `kind`.
    ///
    /// Returns the number of events removed.
    pub fn flush(&self, kind: EventType) -> usize {
        self.flush_range(kind..=kind)
    }

    /// Removes every pending event whose discriminant lies in `kinds`.
    ///
    /// Returns the number of events removed. The relative order of the
    /// remaining events is preserved, and events pushed while the flush runs
    /// are queued after them.
    ///
    /// Kept events no longer occupy channel slots, so a bounded queue may
    /// briefly hold more than its capacity after a flush.
    pub fn flush_range(&self, kinds: RangeInclusive<EventType>) -> usize {
        let mut held = self.held();
        held.extend(self.receiver.try_iter());
        let total = held.len();
        held.retain(|event| !kinds.contains(&event.event_type()));
        let removed = total - held.len();
        if removed > 0 {
            log::debug!("Flushed {removed} event(s) in {kinds:?}.");
        }
        removed
    }

    /// Reserves `count` consecutive application-defined discriminants.
    ///
    /// Returns the first reserved discriminant, or a disengaged [`Optional`]
    /// when `count` is zero or the user range is exhausted.
    pub fn register_events(&self, count: u32) -> Optional<EventType> {
        if count == 0 {
            return Optional::none();
        }
        let reserved = self
            .next_user
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                next.checked_add(count)
                    .filter(|end| *end <= EventType::LAST.raw())
            });
        match reserved {
            Ok(base) => {
                log::debug!("Registered {count} user event type(s) from {base:#x}.");
                Optional::some(EventType(base))
            }
            Err(_) => {
                log::warn!("Cannot register {count} more user event type(s).");
                Optional::none()
            }
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventQueue {
    fn poll_event(&mut self) -> Option<Event> {
        self.held_mut()
            .pop_front()
            .or_else(|| self.receiver.try_recv().ok())
    }

    fn wait_event(&mut self) -> Result<Event, EventError> {
        if let Some(event) = self.held_mut().pop_front() {
            return Ok(event);
        }
        self.receiver.recv().map_err(|_| EventError::Disconnected)
    }

    fn wait_event_timeout(&mut self, timeout: Duration) -> Result<Optional<Event>, EventError> {
        if let Some(event) = self.held_mut().pop_front() {
            return Ok(Optional::some(event));
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Ok(Optional::some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(Optional::none()),
            Err(RecvTimeoutError::Disconnected) => Err(EventError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::event::{poll_all_events_with, KeyboardEvent, QuitEvent};
    use std::thread;

    fn key(pressed: bool, timestamp: u32) -> Event {
        let kind = if pressed {
            EventType::KEY_DOWN
        } else {
            EventType::KEY_UP
        };
        Event::Keyboard(KeyboardEvent {
            common: lumen_core::event::CommonEvent::new(kind, timestamp),
            window_id: 1,
            pressed,
            repeat: false,
            key_code: "KeyA".to_string(),
            modifiers: 0,
        })
    }

    #[test]
    fn try_poll_empty() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.poll_event(), None);
    }

    #[test]
    fn push_and_poll_preserve_order() {
        let mut queue = EventQueue::new();
        queue.push_event(key(true, 1)).expect("push 1");
        queue.push_event(Event::quit(2)).expect("push 2");
        queue.push_event(key(false, 3)).expect("push 3");
        assert_eq!(queue.len(), 3);

        let stamps: Vec<u32> = std::iter::from_fn(|| queue.poll_event())
            .map(|event| event.timestamp())
            .collect();
        assert_eq!(stamps, vec![1, 2, 3]);
    }

    #[test]
    fn bounded_queue_reports_full() {
        let queue = EventQueue::bounded(1);
        queue.push_event(Event::quit(0)).expect("first push");
        assert_eq!(queue.push_event(Event::quit(1)), Err(EventError::QueueFull));
        assert_eq!(lumen_core::get_error(), "event queue is full");
    }

    #[test]
    fn send_from_thread() {
        let mut queue = EventQueue::new();
        let sender = queue.sender();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.send(Event::quit(7)).expect("Send from thread failed");
        });

        match queue.wait_event_timeout(Duration::from_secs(1)) {
            Ok(event) => assert_eq!(event.get().map(Event::timestamp), Some(7)),
            Err(e) => panic!("Failed to receive event from thread: {e:?}"),
        }
        handle.join().expect("Thread join failed");
    }

    #[test]
    fn wait_timeout_elapses_disengaged() {
        let mut queue = EventQueue::new();
        let result = queue.wait_event_timeout(Duration::from_millis(10));
        assert_eq!(result, Ok(Optional::none()));
    }

    #[test]
    fn flush_removes_one_kind_only() {
        let mut queue = EventQueue::bounded(4);
        queue.push_event(key(true, 1)).expect("push");
        queue.push_event(Event::quit(2)).expect("push");
        queue.push_event(key(false, 3)).expect("push");
        queue.push_event(Event::quit(4)).expect("push");

        assert_eq!(queue.flush(EventType::QUIT), 2);
        assert_eq!(queue.len(), 2);

        let mut seen = Vec::new();
        poll_all_events_with(&mut queue, |e: &KeyboardEvent| {
            seen.push(e.common.timestamp)
        });
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn flush_range_spans_keyboard_kinds() {
        let mut queue = EventQueue::new();
        queue.push_event(key(true, 1)).expect("push");
        queue.push_event(key(false, 2)).expect("push");
        queue.push_event(Event::quit(3)).expect("push");

        assert_eq!(
            queue.flush_range(EventType::KEY_DOWN..=EventType::TEXT_INPUT),
            2
        );
        let mut quits = 0;
        poll_all_events_with(&mut queue, |_: &QuitEvent| quits += 1);
        assert_eq!(quits, 1);
    }

    #[test]
    fn flush_keeps_unmatched_events_while_another_thread_sends() {
        for _ in 0..200 {
            let mut queue = EventQueue::bounded(4);
            for code in 0..4 {
                queue
                    .push_event(Event::user(EventType::USER, code, 0))
                    .expect("push");
            }

            let sender = queue.sender();
            let producer = thread::spawn(move || {
                let mut sent = 0;
                while sent < 4 {
                    if sender.try_send(Event::quit(9)).is_ok() {
                        sent += 1;
                    }
                }
            });

            assert_eq!(queue.flush(EventType::WINDOW), 0);
            producer.join().expect("Thread join failed");

            let codes: Vec<i32> = std::iter::from_fn(|| queue.poll_event())
                .take(4)
                .map(|event| match event {
                    Event::User(user) => user.code,
                    other => panic!("Older event overtaken by {other:?}"),
                })
                .collect();
            assert_eq!(codes, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn register_events_reserves_consecutive_ranges() {
        let queue = EventQueue::new();
        assert_eq!(queue.register_events(0), Optional::none());

        let first = queue.register_events(2).into_option().expect("first range");
        let second = queue.register_events(1).into_option().expect("second range");
        assert_eq!(first, EventType::USER);
        assert_eq!(second, EventType(EventType::USER.raw() + 2));
        assert!(second.is_user());
    }

    #[test]
    fn register_events_exhausts_the_user_range() {
        let queue = EventQueue::new();
        let span = EventType::LAST.raw() - EventType::USER.raw();
        assert!(queue.register_events(span).has_value());
        assert!(!queue.register_events(1).has_value());
    }

    #[test]
    fn registered_kinds_route_to_user_handlers() {
        let mut queue = EventQueue::new();
        let kind = queue.register_events(1).value_or(EventType::USER);
        queue.push_event(Event::user(kind, 42, 0)).expect("push");

        let mut codes = Vec::new();
        poll_all_events_with(&mut queue, |e: &lumen_core::event::UserEvent| {
            codes.push(e.code)
        });
        assert_eq!(codes, vec![42]);
    }
}
