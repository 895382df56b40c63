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

//! The tagged event model and its compile-time dispatch engine.
//!
//! An [`Event`] is produced by an external [`EventSource`] one at a time and
//! routed by [`dispatch_event`] to every caller-supplied handler whose
//! accepted payload type matches the event's discriminant. The set of payload
//! types is closed (see [`EventSubtype`]); a handler that accepts none of them
//! is rejected at compile time.

mod dispatch;
mod registry;
mod source;
mod types;

pub use self::dispatch::{
    dispatch_event, EventHandler, FnHandler, Handle, HandlerSet, HandlerTuple, MethodHandler,
    SingleHandler,
};
pub use self::registry::{registered_subtypes, EventSubtype};
pub use self::source::{
    poll_all_events, poll_all_events_with, poll_event, poll_event_with, wait_event,
    wait_event_timeout, EventError, EventSource,
};
pub use self::types::{
    AudioDeviceEvent, CommonEvent, DropEvent, Event, EventType, KeyboardEvent, MouseButton,
    MouseButtonEvent, MouseMotionEvent, MouseWheelEvent, QuitEvent, TextEditingEvent,
    TextInputEvent, UserEvent, WindowEvent, WindowEventKind, MOD_ALT, MOD_CTRL, MOD_GUI,
    MOD_NONE, MOD_SHIFT,
};
