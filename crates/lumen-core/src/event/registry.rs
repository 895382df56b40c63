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

//! The closed registry of event payload types.
//!
//! Each payload type implements [`EventSubtype`], pairing a discriminant
//! predicate with an accessor that views an [`Event`] as that payload. The
//! trait is sealed: the set is fixed at build time and handlers can only be
//! written against these types.

use super::types::{
    AudioDeviceEvent, CommonEvent, DropEvent, Event, EventType, KeyboardEvent, MouseButtonEvent,
    MouseMotionEvent, MouseWheelEvent, QuitEvent, TextEditingEvent, TextInputEvent, UserEvent,
    WindowEvent,
};

mod sealed {
    pub trait Sealed {}
}

/// A payload type known to the dispatch engine.
///
/// `matches` is the discriminant predicate and `view` the accessor. For every
/// specific subtype at most one of them matches a given event; the generic
/// [`CommonEvent`] matches every event and is consulted after the specific ones.
pub trait EventSubtype: sealed::Sealed + Sized + 'static {
    /// Human-readable name, used in diagnostics.
    const NAME: &'static str;

    /// `true` only for the catch-all [`CommonEvent`] view.
    const GENERIC: bool = false;

    /// Returns `true` if `event`'s discriminant selects this payload.
    fn matches(event: &Event) -> bool;

    /// Views `event` as this payload, if its discriminant selects it.
    fn view(event: &Event) -> Option<&Self>;
}

macro_rules! specific_subtype {
    ($ty:ident, $variant:ident, |$kind:ident| $predicate:expr) => {
        impl sealed::Sealed for $ty {}

        impl EventSubtype for $ty {
            const NAME: &'static str = stringify!($ty);

            fn matches(event: &Event) -> bool {
                let $kind = event.event_type();
                $predicate
            }

            fn view(event: &Event) -> Option<&Self> {
                match event {
                    Event::$variant(payload) if Self::matches(event) => Some(payload),
                    _ => None,
                }
            }
        }
    };
}

specific_subtype!(KeyboardEvent, Keyboard, |kind| {
    kind == EventType::KEY_DOWN || kind == EventType::KEY_UP
});
specific_subtype!(MouseButtonEvent, MouseButton, |kind| {
    kind == EventType::MOUSE_BUTTON_DOWN || kind == EventType::MOUSE_BUTTON_UP
});
specific_subtype!(MouseMotionEvent, MouseMotion, |kind| {
    kind == EventType::MOUSE_MOTION
});
specific_subtype!(MouseWheelEvent, MouseWheel, |kind| kind == EventType::MOUSE_WHEEL);
specific_subtype!(TextEditingEvent, TextEditing, |kind| {
    kind == EventType::TEXT_EDITING
});
specific_subtype!(TextInputEvent, TextInput, |kind| kind == EventType::TEXT_INPUT);
specific_subtype!(WindowEvent, Window, |kind| kind == EventType::WINDOW);
specific_subtype!(QuitEvent, Quit, |kind| kind == EventType::QUIT);
specific_subtype!(DropEvent, Drop, |kind| kind == EventType::DROP_FILE);
specific_subtype!(AudioDeviceEvent, AudioDevice, |kind| {
    kind == EventType::AUDIO_DEVICE_ADDED || kind == EventType::AUDIO_DEVICE_REMOVED
});
specific_subtype!(UserEvent, User, |kind| kind.is_user());

impl sealed::Sealed for CommonEvent {}

impl EventSubtype for CommonEvent {
    const NAME: &'static str = "CommonEvent";
    const GENERIC: bool = true;

    fn matches(_: &Event) -> bool {
        true
    }

    fn view(event: &Event) -> Option<&Self> {
        Some(event.common())
    }
}

/// Names of the registered subtypes, in registry order.
pub fn registered_subtypes() -> &'static [&'static str] {
    const NAMES: &[&str] = &[
        KeyboardEvent::NAME,
        MouseButtonEvent::NAME,
        MouseMotionEvent::NAME,
        MouseWheelEvent::NAME,
        TextEditingEvent::NAME,
        TextInputEvent::NAME,
        WindowEvent::NAME,
        QuitEvent::NAME,
        DropEvent::NAME,
        AudioDeviceEvent::NAME,
        UserEvent::NAME,
        CommonEvent::NAME,
    ];
    NAMES
}
