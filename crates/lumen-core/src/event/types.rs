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

//! Event payload types and the tagged [`Event`] value.

use std::path::PathBuf;

/// The discriminant of a tagged event, using the native library's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventType(pub u32);

impl EventType {
    /// The application was asked to quit.
    pub const QUIT: Self = Self(0x100);
    /// A window state change.
    pub const WINDOW: Self = Self(0x200);
    /// A key was pressed.
    pub const KEY_DOWN: Self = Self(0x300);
    /// A key was released.
    pub const KEY_UP: Self = Self(0x301);
    /// Text composition is in progress.
    pub const TEXT_EDITING: Self = Self(0x302);
    /// Text was committed.
    pub const TEXT_INPUT: Self = Self(0x303);
    /// The mouse moved.
    pub const MOUSE_MOTION: Self = Self(0x400);
    /// A mouse button was pressed.
    pub const MOUSE_BUTTON_DOWN: Self = Self(0x401);
    /// A mouse button was released.
    pub const MOUSE_BUTTON_UP: Self = Self(0x402);
    /// The mouse wheel was scrolled.
    pub const MOUSE_WHEEL: Self = Self(0x403);
    /// A file was dropped on a window.
    pub const DROP_FILE: Self = Self(0x1000);
    /// An audio device became available.
    pub const AUDIO_DEVICE_ADDED: Self = Self(0x1100);
    /// An audio device was removed.
    pub const AUDIO_DEVICE_REMOVED: Self = Self(0x1101);
    /// First discriminant reserved for application-defined events.
    pub const USER: Self = Self(0x8000);
    /// Last valid discriminant.
    pub const LAST: Self = Self(0xFFFF);

    /// Returns the raw discriminant.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` for discriminants in the application-defined range.
    pub const fn is_user(self) -> bool {
        self.0 >= Self::USER.0 && self.0 <= Self::LAST.0
    }
}

/// Modifier bit for no modifier.
pub const MOD_NONE: u16 = 0x0000;
/// Modifier bit for either Shift key.
pub const MOD_SHIFT: u16 = 0x0001;
/// Modifier bit for either Control key.
pub const MOD_CTRL: u16 = 0x0040;
/// Modifier bit for either Alt key.
pub const MOD_ALT: u16 = 0x0100;
/// Modifier bit for either GUI (Super/Command) key.
pub const MOD_GUI: u16 = 0x0400;

/// The fields every event carries. This is the generic view of any event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommonEvent {
    /// The event discriminant.
    pub kind: EventType,
    /// Milliseconds since the event source started.
    pub timestamp: u32,
}

impl CommonEvent {
    /// Creates the common header for an event.
    pub const fn new(kind: EventType, timestamp: u32) -> Self {
        Self { kind, timestamp }
    }
}

/// The application was asked to quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitEvent {
    /// Common header; `kind` is [`EventType::QUIT`].
    pub common: CommonEvent,
}

/// The specific change a [`WindowEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    /// The window became visible.
    Shown,
    /// The window was hidden.
    Hidden,
    /// The window needs to be redrawn.
    Exposed,
    /// The window moved to (`data1`, `data2`).
    Moved,
    /// The window was resized to `data1` x `data2`.
    Resized,
    /// The window was minimized.
    Minimized,
    /// The window was maximized.
    Maximized,
    /// The window was restored to normal size and position.
    Restored,
    /// The mouse entered the window.
    Enter,
    /// The mouse left the window.
    Leave,
    /// The window gained keyboard focus.
    FocusGained,
    /// The window lost keyboard focus.
    FocusLost,
    /// The window manager requests that the window be closed.
    Close,
}

/// A window state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    /// Common header; `kind` is [`EventType::WINDOW`].
    pub common: CommonEvent,
    /// The window the event refers to.
    pub window_id: u32,
    /// What happened to the window.
    pub event: WindowEventKind,
    /// First event-dependent value.
    pub data1: i32,
    /// Second event-dependent value.
    pub data2: i32,
}

/// A key was pressed or released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Common header; `kind` is [`EventType::KEY_DOWN`] or [`EventType::KEY_UP`].
    pub common: CommonEvent,
    /// The window with keyboard focus.
    pub window_id: u32,
    /// `true` when the key is down.
    pub pressed: bool,
    /// `true` for key repeats.
    pub repeat: bool,
    /// A string representation of the physical key code.
    pub key_code: String,
    /// Active modifier bits (`MOD_*`).
    pub modifiers: u16,
}

/// Text composition is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditingEvent {
    /// Common header; `kind` is [`EventType::TEXT_EDITING`].
    pub common: CommonEvent,
    /// The window with keyboard focus.
    pub window_id: u32,
    /// The text being composed.
    pub text: String,
    /// Cursor position within the composition, if known.
    pub cursor: Option<(usize, usize)>,
}

/// Text was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputEvent {
    /// Common header; `kind` is [`EventType::TEXT_INPUT`].
    pub common: CommonEvent,
    /// The window with keyboard focus.
    pub window_id: u32,
    /// The committed text.
    pub text: String,
}

/// The mouse moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMotionEvent {
    /// Common header; `kind` is [`EventType::MOUSE_MOTION`].
    pub common: CommonEvent,
    /// The window with mouse focus.
    pub window_id: u32,
    /// The new x-coordinate of the cursor.
    pub x: f32,
    /// The new y-coordinate of the cursor.
    pub y: f32,
    /// Horizontal motion since the last motion event.
    pub xrel: f32,
    /// Vertical motion since the last motion event.
    pub yrel: f32,
}

/// An engine-internal representation of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// The back mouse button (typically on the side).
    Back,
    /// The forward mouse button (typically on the side).
    Forward,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// A mouse button was pressed or released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonEvent {
    /// Common header; `kind` is [`EventType::MOUSE_BUTTON_DOWN`] or [`EventType::MOUSE_BUTTON_UP`].
    pub common: CommonEvent,
    /// The window with mouse focus.
    pub window_id: u32,
    /// The button that changed.
    pub button: MouseButton,
    /// `true` when the button is down.
    pub pressed: bool,
    /// Cursor x-coordinate at the time of the event.
    pub x: f32,
    /// Cursor y-coordinate at the time of the event.
    pub y: f32,
}

/// The mouse wheel was scrolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseWheelEvent {
    /// Common header; `kind` is [`EventType::MOUSE_WHEEL`].
    pub common: CommonEvent,
    /// The window with mouse focus.
    pub window_id: u32,
    /// The horizontal scroll delta.
    pub delta_x: f32,
    /// The vertical scroll delta.
    pub delta_y: f32,
}

/// A file was dropped on a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    /// Common header; `kind` is [`EventType::DROP_FILE`].
    pub common: CommonEvent,
    /// The window that received the drop.
    pub window_id: u32,
    /// The dropped file.
    pub file: PathBuf,
}

/// An audio device was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioDeviceEvent {
    /// Common header; `kind` is [`EventType::AUDIO_DEVICE_ADDED`] or [`EventType::AUDIO_DEVICE_REMOVED`].
    pub common: CommonEvent,
    /// Device index (added) or instance id (removed).
    pub which: u32,
    /// `true` for capture devices.
    pub is_capture: bool,
}

/// An application-defined event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEvent {
    /// Common header; `kind` is in the user range (see [`EventType::is_user`]).
    pub common: CommonEvent,
    /// The associated window, if any (`0` otherwise).
    pub window_id: u32,
    /// Application-defined code.
    pub code: i32,
    /// Application-defined payload.
    pub data1: u64,
    /// Application-defined payload.
    pub data2: u64,
}

/// A tagged event: a discriminant plus the payload it selects.
///
/// The discriminant is stored once, in the payload's [`CommonEvent`] header,
/// so the payload view and the tag cannot disagree. Discriminants outside
/// the known set are carried as [`Event::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// See [`QuitEvent`].
    Quit(QuitEvent),
    /// See [`WindowEvent`].
    Window(WindowEvent),
    /// See [`KeyboardEvent`].
    Keyboard(KeyboardEvent),
    /// See [`TextEditingEvent`].
    TextEditing(TextEditingEvent),
    /// See [`TextInputEvent`].
    TextInput(TextInputEvent),
    /// See [`MouseMotionEvent`].
    MouseMotion(MouseMotionEvent),
    /// See [`MouseButtonEvent`].
    MouseButton(MouseButtonEvent),
    /// See [`MouseWheelEvent`].
    MouseWheel(MouseWheelEvent),
    /// See [`DropEvent`].
    Drop(DropEvent),
    /// See [`AudioDeviceEvent`].
    AudioDevice(AudioDeviceEvent),
    /// See [`UserEvent`].
    User(UserEvent),
    /// An event whose discriminant has no dedicated payload.
    Other(CommonEvent),
}

impl Event {
    /// Returns the generic view shared by every event.
    pub fn common(&self) -> &CommonEvent {
        match self {
            Event::Quit(e) => &e.common,
            Event::Window(e) => &e.common,
            Event::Keyboard(e) => &e.common,
            Event::TextEditing(e) => &e.common,
            Event::TextInput(e) => &e.common,
            Event::MouseMotion(e) => &e.common,
            Event::MouseButton(e) => &e.common,
            Event::MouseWheel(e) => &e.common,
            Event::Drop(e) => &e.common,
            Event::AudioDevice(e) => &e.common,
            Event::User(e) => &e.common,
            Event::Other(common) => common,
        }
    }

    /// Returns the event discriminant.
    pub fn event_type(&self) -> EventType {
        self.common().kind
    }

    /// Returns the event timestamp in milliseconds.
    pub fn timestamp(&self) -> u32 {
        self.common().timestamp
    }

    /// Creates a quit request.
    pub fn quit(timestamp: u32) -> Self {
        Event::Quit(QuitEvent {
            common: CommonEvent::new(EventType::QUIT, timestamp),
        })
    }

    /// Creates an application-defined event with discriminant `kind`.
    pub fn user(kind: EventType, code: i32, timestamp: u32) -> Self {
        Event::User(UserEvent {
            common: CommonEvent::new(kind, timestamp),
            window_id: 0,
            code,
            data1: 0,
            data2: 0,
        })
    }
}

macro_rules! impl_from_payload {
    ($($payload:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$payload> for Event {
                fn from(payload: $payload) -> Self {
                    Event::$variant(payload)
                }
            }
        )+
    };
}

impl_from_payload! {
    QuitEvent => Quit,
    WindowEvent => Window,
    KeyboardEvent => Keyboard,
    TextEditingEvent => TextEditing,
    TextInputEvent => TextInput,
    MouseMotionEvent => MouseMotion,
    MouseButtonEvent => MouseButton,
    MouseWheelEvent => MouseWheel,
    DropEvent => Drop,
    AudioDeviceEvent => AudioDevice,
    UserEvent => User,
    CommonEvent => Other,
}
