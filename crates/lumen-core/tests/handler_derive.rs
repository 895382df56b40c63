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

//! Integration tests for method-style handlers generated by `#[derive(EventHandler)]`.

use lumen_core::event::{
    dispatch_event, CommonEvent, Event, EventType, Handle, KeyboardEvent, MouseButton,
    MouseButtonEvent, QuitEvent, UserEvent,
};

fn key_down(key: &str) -> Event {
    Event::Keyboard(KeyboardEvent {
        common: CommonEvent::new(EventType::KEY_DOWN, 100),
        window_id: 1,
        pressed: true,
        repeat: false,
        key_code: key.to_string(),
        modifiers: 0,
    })
}

fn left_click() -> Event {
    Event::MouseButton(MouseButtonEvent {
        common: CommonEvent::new(EventType::MOUSE_BUTTON_DOWN, 101),
        window_id: 1,
        button: MouseButton::Left,
        pressed: true,
        x: 10.0,
        y: 20.0,
    })
}

#[derive(Default, lumen_macros::EventHandler)]
#[handles(KeyboardEvent, QuitEvent)]
struct InputLog {
    keys: Vec<String>,
    quit: bool,
}

impl Handle<KeyboardEvent> for InputLog {
    fn handle(&mut self, event: &KeyboardEvent) {
        self.keys.push(event.key_code.clone());
    }
}

impl Handle<QuitEvent> for InputLog {
    fn handle(&mut self, _: &QuitEvent) {
        self.quit = true;
    }
}

/// Lists the generic view first to show that specific subtypes still win.
#[derive(Default, lumen_macros::EventHandler)]
#[handles(CommonEvent, UserEvent)]
struct Fallback {
    generic: Vec<EventType>,
    user_codes: Vec<i32>,
}

impl Handle<CommonEvent> for Fallback {
    fn handle(&mut self, event: &CommonEvent) {
        self.generic.push(event.kind);
    }
}

impl Handle<UserEvent> for Fallback {
    fn handle(&mut self, event: &UserEvent) {
        self.user_codes.push(event.code);
    }
}

#[test]
fn derived_handler_receives_each_listed_subtype() {
    let mut log = InputLog::default();
    assert_eq!(dispatch_event(&key_down("KeyW"), &mut log), 1);
    assert_eq!(dispatch_event(&Event::quit(0), &mut log), 1);
    assert_eq!(log.keys, vec!["KeyW".to_string()]);
    assert!(log.quit);
}

#[test]
fn derived_handler_ignores_unlisted_subtypes() {
    let mut log = InputLog::default();
    assert_eq!(dispatch_event(&left_click(), &mut log), 0);
    assert!(log.keys.is_empty());
    assert!(!log.quit);
}

#[test]
fn specific_subtype_is_preferred_over_generic_view() {
    let mut fallback = Fallback::default();
    dispatch_event(&Event::user(EventType(0x8010), 3, 0), &mut fallback);
    dispatch_event(&left_click(), &mut fallback);

    assert_eq!(fallback.user_codes, vec![3]);
    assert_eq!(fallback.generic, vec![EventType::MOUSE_BUTTON_DOWN]);
}

#[test]
fn derived_and_closure_handlers_mix_in_one_call() {
    let mut log = InputLog::default();
    let mut fallback = Fallback::default();
    let mut presses = 0;

    let delivered = dispatch_event(
        &key_down("Escape"),
        (
            &mut log,
            &mut fallback,
            |k: &KeyboardEvent| {
                if k.pressed {
                    presses += 1;
                }
            },
            |_: &MouseButtonEvent| panic!("mouse handler must not run"),
        ),
    );

    assert_eq!(delivered, 3);
    assert_eq!(log.keys, vec!["Escape".to_string()]);
    assert_eq!(fallback.generic, vec![EventType::KEY_DOWN]);
    assert_eq!(presses, 1);
}

#[test]
fn owned_handler_can_be_passed_by_value() {
    let delivered = dispatch_event(&Event::quit(0), InputLog::default());
    assert_eq!(delivered, 1);
}
