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

//! The public-facing API of the Lumen wrapper layer.
//!
//! This crate ties the event model, the byte-stream bridge and the event
//! queue together behind a small facade, [`Lumen`], and a [`prelude`].

use anyhow::{bail, Context, Result};
use lumen_core::event::{
    dispatch_event, poll_all_events_with, poll_event_with, wait_event, wait_event_timeout, Event,
    EventType, HandlerSet,
};
use lumen_core::{LumenError, LumenSettings, Optional};
use lumen_infra::{init_logging, EventQueue};
use lumen_io::RWops;
use std::path::Path;
use std::time::Duration;

pub use lumen_core;
pub use lumen_infra;
pub use lumen_io;

pub mod prelude {
    //! Everything an application needs to dispatch events and open streams.

    pub use crate::Lumen;
    pub use lumen_core::event::{
        dispatch_event, AudioDeviceEvent, CommonEvent, DropEvent, Event, EventError,
        EventHandler, EventSource, EventSubtype, EventType, Handle, HandlerSet, KeyboardEvent,
        MouseButton, MouseButtonEvent, MouseMotionEvent, MouseWheelEvent, QuitEvent,
        TextEditingEvent, TextInputEvent, UserEvent, WindowEvent, WindowEventKind, MOD_ALT,
        MOD_CTRL, MOD_GUI, MOD_NONE, MOD_SHIFT,
    };
    pub use lumen_core::stream::{StreamBacking, StreamError, Whence};
    pub use lumen_core::{
        clear_error, get_error, set_error, LumenError, LumenSettings, Nothing, Optional, NOTHING,
    };
    pub use lumen_infra::EventQueue;
    #[cfg(feature = "platform")]
    pub use lumen_infra::InputTranslator;
    pub use lumen_io::{FileMode, RWops};
    pub use lumen_macros::EventHandler;
}

/// An initialized wrapper layer: the settings it was started with and the
/// event queue applications poll.
#[derive(Debug)]
pub struct Lumen {
    settings: LumenSettings,
    queue: EventQueue,
}

impl Lumen {
    /// Installs the logger and creates the event queue.
    ///
    /// # Errors
    /// Fails if the settings are unusable (a zero queue capacity).
    pub fn new(settings: LumenSettings) -> Result<Self> {
        if settings.event_queue_capacity == Some(0) {
            bail!("event_queue_capacity must be at least 1");
        }
        init_logging(&settings.log_filter);
        let queue = EventQueue::from_settings(&settings);
        log::info!("Lumen initialized.");
        Ok(Self { settings, queue })
    }

    /// Loads RON settings from `path`, then calls [`Lumen::new`].
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = LumenSettings::load(path)
            .with_context(|| format!("Failed to start Lumen from '{}'", path.display()))?;
        Self::new(settings)
    }

    /// Returns the settings Lumen was started with.
    pub fn settings(&self) -> &LumenSettings {
        &self.settings
    }

    /// Returns the event queue.
    pub fn events(&self) -> &EventQueue {
        &self.queue
    }

    /// Returns the event queue mutably, for use as an `EventSource`.
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// Appends an event to the queue.
    pub fn push_event(&self, event: impl Into<Event>) -> Result<()> {
        self.queue.push_event(event).map_err(LumenError::from)?;
        Ok(())
    }

    /// Reserves `count` application-defined event types.
    pub fn register_events(&self, count: u32) -> Optional<EventType> {
        self.queue.register_events(count)
    }

    /// Pops one pending event and routes it through `handlers`.
    ///
    /// Returns `true` if an event was pending.
    pub fn poll<M>(&mut self, handlers: impl HandlerSet<M>) -> bool {
        poll_event_with(&mut self.queue, handlers)
    }

    /// Routes every pending event through `handlers`.
    ///
    /// Returns the number of events processed.
    pub fn pump<M>(&mut self, handlers: impl HandlerSet<M>) -> usize {
        poll_all_events_with(&mut self.queue, handlers)
    }

    /// Waits for the next event.
    ///
    /// `None` falls back to `default_wait_timeout_ms`; with neither set the
    /// call blocks until an event arrives. The result is disengaged when the
    /// timeout elapses.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<Optional<Event>> {
        let timeout = timeout.or_else(|| {
            self.settings
                .default_wait_timeout_ms
                .map(Duration::from_millis)
        });
        let waited = match timeout {
            Some(timeout) => wait_event_timeout(&mut self.queue, timeout),
            None => wait_event(&mut self.queue).map(Optional::some),
        };
        waited.map_err(|_| LumenError::from_last_error().into())
    }

    /// Waits for the next event and routes it through `handlers`.
    ///
    /// Returns `true` if an event arrived before the timeout.
    pub fn wait_with<M>(
        &mut self,
        timeout: Option<Duration>,
        handlers: impl HandlerSet<M>,
    ) -> Result<bool> {
        match self.wait(timeout)?.into_option() {
            Some(event) => {
                dispatch_event(&event, handlers);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Opens a file stream with an `fopen`-style mode.
    pub fn open_file(&self, path: impl AsRef<Path>, mode: &str) -> Result<RWops<'static>> {
        let path = path.as_ref();
        RWops::from_file(path, mode)
            .map_err(LumenError::from)
            .with_context(|| format!("Failed to open '{}'", path.display()))
    }
}
