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

//! Provides translation from a concrete windowing backend (`winit`) to Lumen's tagged events.
//!
//! This module acts as an adapter layer, decoupling the event model from the
//! specific event format of the `winit` crate.

use crate::event_queue::EventQueue;
use lumen_core::event::{
    CommonEvent, DropEvent, Event, EventError, EventType, KeyboardEvent, MouseButton,
    MouseButtonEvent, MouseMotionEvent, MouseWheelEvent, TextEditingEvent, TextInputEvent,
    WindowEvent as LumenWindowEvent, WindowEventKind, MOD_ALT, MOD_CTRL, MOD_GUI, MOD_NONE,
    MOD_SHIFT,
};
use winit::event::{
    ElementState, Ime, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Translates the events of one window, tracking the state the tagged events
/// need but `winit` reports separately: the cursor position and the active
/// modifiers.
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    window_id: u32,
    modifiers: u16,
    cursor: Option<(f32, f32)>,
}

impl InputTranslator {
    /// Creates a translator that stamps events with `window_id`.
    pub fn new(window_id: u32) -> Self {
        Self {
            window_id,
            ..Self::default()
        }
    }

    /// Returns the active modifier bits (`MOD_*`).
    pub fn modifiers(&self) -> u16 {
        self.modifiers
    }

    /// Translates a `winit` window event.
    ///
    /// Returns `None` for events with no tagged counterpart, and for events
    /// that only update the translator's state (modifier changes).
    pub fn translate(&mut self, event: &WindowEvent, timestamp: u32) -> Option<Event> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.keyboard(event, timestamp),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifier_bits(modifiers.state());
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                let (xrel, yrel) = self.cursor.map_or((0.0, 0.0), |(px, py)| (x - px, y - py));
                self.cursor = Some((x, y));
                Some(Event::MouseMotion(MouseMotionEvent {
                    common: CommonEvent::new(EventType::MOUSE_MOTION, timestamp),
                    window_id: self.window_id,
                    x,
                    y,
                    xrel,
                    yrel,
                }))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                let kind = if pressed {
                    EventType::MOUSE_BUTTON_DOWN
                } else {
                    EventType::MOUSE_BUTTON_UP
                };
                let (x, y) = self.cursor.unwrap_or_default();
                Some(Event::MouseButton(MouseButtonEvent {
                    common: CommonEvent::new(kind, timestamp),
                    window_id: self.window_id,
                    button: map_mouse_button(*button),
                    pressed,
                    x,
                    y,
                }))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy): (f32, f32) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
                };
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(Event::MouseWheel(MouseWheelEvent {
                    common: CommonEvent::new(EventType::MOUSE_WHEEL, timestamp),
                    window_id: self.window_id,
                    delta_x: dx,
                    delta_y: dy,
                }))
            }
            WindowEvent::Ime(Ime::Preedit(text, cursor)) => {
                Some(Event::TextEditing(TextEditingEvent {
                    common: CommonEvent::new(EventType::TEXT_EDITING, timestamp),
                    window_id: self.window_id,
                    text: text.clone(),
                    cursor: *cursor,
                }))
            }
            WindowEvent::Ime(Ime::Commit(text)) => Some(self.text_input(text, timestamp)),
            WindowEvent::DroppedFile(path) => Some(Event::Drop(DropEvent {
                common: CommonEvent::new(EventType::DROP_FILE, timestamp),
                window_id: self.window_id,
                file: path.clone(),
            })),
            WindowEvent::Resized(size) => Some(self.window(
                WindowEventKind::Resized,
                saturate(size.width),
                saturate(size.height),
                timestamp,
            )),
            WindowEvent::Moved(position) => Some(self.window(
                WindowEventKind::Moved,
                position.x,
                position.y,
                timestamp,
            )),
            WindowEvent::Focused(true) => {
                Some(self.window(WindowEventKind::FocusGained, 0, 0, timestamp))
            }
            WindowEvent::Focused(false) => {
                Some(self.window(WindowEventKind::FocusLost, 0, 0, timestamp))
            }
            WindowEvent::CursorEntered { .. } => {
                Some(self.window(WindowEventKind::Enter, 0, 0, timestamp))
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                Some(self.window(WindowEventKind::Leave, 0, 0, timestamp))
            }
            WindowEvent::Occluded(true) => {
                Some(self.window(WindowEventKind::Hidden, 0, 0, timestamp))
            }
            WindowEvent::Occluded(false) => {
                Some(self.window(WindowEventKind::Shown, 0, 0, timestamp))
            }
            WindowEvent::RedrawRequested => {
                Some(self.window(WindowEventKind::Exposed, 0, 0, timestamp))
            }
            WindowEvent::CloseRequested => {
                Some(self.window(WindowEventKind::Close, 0, 0, timestamp))
            }
            _ => None,
        }
    }

    /// Translates `event` and pushes the result into `queue`, stamped with
    /// the queue's clock.
    ///
    /// A key press that carries printable text also pushes a text-input
    /// event after the key event. Returns the number of events pushed.
    ///
    /// # Errors
    /// Propagates [`EventQueue::push_event`] failures.
    pub fn forward(&mut self, event: &WindowEvent, queue: &EventQueue) -> Result<usize, EventError> {
        let timestamp = queue.ticks();
        let Some(translated) = self.translate(event, timestamp) else {
            return Ok(0);
        };
        queue.push_event(translated)?;

        let text = match event {
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                event.text.as_deref().filter(|text| is_printable(text))
            }
            _ => None,
        };
        match text {
            Some(text) => {
                queue.push_event(self.text_input(text, timestamp))?;
                Ok(2)
            }
            None => Ok(1),
        }
    }

    fn keyboard(&self, event: &KeyEvent, timestamp: u32) -> Option<Event> {
        let PhysicalKey::Code(keycode) = event.physical_key else {
            return None;
        };
        let pressed = event.state == ElementState::Pressed;
        let kind = if pressed {
            EventType::KEY_DOWN
        } else {
            EventType::KEY_UP
        };
        Some(Event::Keyboard(KeyboardEvent {
            common: CommonEvent::new(kind, timestamp),
            window_id: self.window_id,
            pressed,
            repeat: event.repeat,
            key_code: map_keycode_to_string(keycode),
            modifiers: self.modifiers,
        }))
    }

    fn text_input(&self, text: &str, timestamp: u32) -> Event {
        Event::TextInput(TextInputEvent {
            common: CommonEvent::new(EventType::TEXT_INPUT, timestamp),
            window_id: self.window_id,
            text: text.to_owned(),
        })
    }

    fn window(&self, kind: WindowEventKind, data1: i32, data2: i32, timestamp: u32) -> Event {
        Event::Window(LumenWindowEvent {
            common: CommonEvent::new(EventType::WINDOW, timestamp),
            window_id: self.window_id,
            event: kind,
            data1,
            data2,
        })
    }
}

/// Translates a single `winit` window event with no tracked state.
///
/// Motion deltas are zero and key events carry no modifiers; use an
/// [`InputTranslator`] to get both.
pub fn translate_winit_event(event: &WindowEvent, timestamp: u32) -> Option<Event> {
    InputTranslator::default().translate(event, timestamp)
}

// --- Private Helper Functions ---

/// (Internal) Maps a `winit::keyboard::KeyCode` to a string representation.
fn map_keycode_to_string(keycode: KeyCode) -> String {
    format!("{keycode:?}")
}

/// (Internal) Maps a `winit::event::MouseButton` to the event model's `MouseButton`.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

fn modifier_bits(state: ModifiersState) -> u16 {
    [
        (state.shift_key(), MOD_SHIFT),
        (state.control_key(), MOD_CTRL),
        (state.alt_key(), MOD_ALT),
        (state.super_key(), MOD_GUI),
    ]
    .into_iter()
    .filter(|(active, _)| *active)
    .fold(MOD_NONE, |bits, (_, bit)| bits | bit)
}

fn saturate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn is_printable(text: &str) -> bool {
    !text.is_empty() && !text.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::DeviceId;

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: DeviceId::dummy(),
            position: PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn test_map_keycode_simple() {
        assert_eq!(map_keycode_to_string(KeyCode::KeyA), "KeyA");
        assert_eq!(map_keycode_to_string(KeyCode::Digit1), "Digit1");
        assert_eq!(map_keycode_to_string(KeyCode::Space), "Space");
    }

    #[test]
    fn test_map_mouse_button() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(
            map_mouse_button(WinitMouseButton::Forward),
            MouseButton::Forward
        );
        assert_eq!(
            map_mouse_button(WinitMouseButton::Other(8)),
            MouseButton::Other(8)
        );
    }

    #[test]
    fn test_modifier_bits() {
        assert_eq!(modifier_bits(ModifiersState::empty()), MOD_NONE);
        assert_eq!(
            modifier_bits(ModifiersState::SHIFT | ModifiersState::CONTROL),
            MOD_SHIFT | MOD_CTRL
        );
        assert_eq!(
            modifier_bits(ModifiersState::ALT | ModifiersState::SUPER),
            MOD_ALT | MOD_GUI
        );
    }

    #[test]
    fn test_cursor_motion_tracks_relative_movement() {
        let mut translator = InputTranslator::new(3);
        let first = translator.translate(&cursor_moved(10.0, 20.0), 1);
        let second = translator.translate(&cursor_moved(15.5, 18.0), 2);

        match (first, second) {
            (Some(Event::MouseMotion(a)), Some(Event::MouseMotion(b))) => {
                assert_eq!((a.xrel, a.yrel), (0.0, 0.0));
                assert_eq!((b.x, b.y, b.xrel, b.yrel), (15.5, 18.0, 5.5, -2.0));
                assert_eq!(b.window_id, 3);
                assert_eq!(b.common.timestamp, 2);
            }
            other => panic!("Expected two motion events, got {other:?}"),
        }
    }

    #[test]
    fn test_mouse_button_uses_last_cursor_position() {
        let mut translator = InputTranslator::new(1);
        translator.translate(&cursor_moved(4.0, 8.0), 0);
        let event = WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Released,
            button: WinitMouseButton::Right,
        };

        let translated = translator.translate(&event, 5);
        assert_eq!(
            translated,
            Some(Event::MouseButton(MouseButtonEvent {
                common: CommonEvent::new(EventType::MOUSE_BUTTON_UP, 5),
                window_id: 1,
                button: MouseButton::Right,
                pressed: false,
                x: 4.0,
                y: 8.0,
            }))
        );
    }

    #[test]
    fn test_mouse_wheel_pixel_and_zero() {
        let scroll = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(5.5, -10.0)),
            phase: winit::event::TouchPhase::Moved,
        };
        let idle = WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 0.0),
            phase: winit::event::TouchPhase::Moved,
        };

        match translate_winit_event(&scroll, 0) {
            Some(Event::MouseWheel(wheel)) => {
                assert_eq!((wheel.delta_x, wheel.delta_y), (5.5, -10.0));
            }
            other => panic!("Expected a wheel event, got {other:?}"),
        }
        assert_eq!(translate_winit_event(&idle, 0), None);
    }

    #[test]
    fn test_window_state_changes() {
        let resized = translate_winit_event(&WindowEvent::Resized(PhysicalSize::new(800, 600)), 9);
        assert_eq!(
            resized,
            Some(Event::Window(LumenWindowEvent {
                common: CommonEvent::new(EventType::WINDOW, 9),
                window_id: 0,
                event: WindowEventKind::Resized,
                data1: 800,
                data2: 600,
            }))
        );

        let kinds: Vec<WindowEventKind> = [
            WindowEvent::Focused(true),
            WindowEvent::Focused(false),
            WindowEvent::CloseRequested,
            WindowEvent::Occluded(true),
        ]
        .iter()
        .filter_map(|event| match translate_winit_event(event, 0) {
            Some(Event::Window(window)) => Some(window.event),
            _ => None,
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                WindowEventKind::FocusGained,
                WindowEventKind::FocusLost,
                WindowEventKind::Close,
                WindowEventKind::Hidden,
            ]
        );
    }

    #[test]
    fn test_text_and_drop() {
        let commit = WindowEvent::Ime(Ime::Commit("héllo".to_string()));
        let preedit = WindowEvent::Ime(Ime::Preedit("hé".to_string(), Some((1, 3))));
        let dropped = WindowEvent::DroppedFile(PathBuf::from("/tmp/a.png"));

        assert!(matches!(
            translate_winit_event(&commit, 0),
            Some(Event::TextInput(TextInputEvent { ref text, .. })) if text == "héllo"
        ));
        assert!(matches!(
            translate_winit_event(&preedit, 0),
            Some(Event::TextEditing(TextEditingEvent { cursor: Some((1, 3)), .. }))
        ));
        assert!(matches!(
            translate_winit_event(&dropped, 0),
            Some(Event::Drop(DropEvent { ref file, .. })) if file == &PathBuf::from("/tmp/a.png")
        ));
    }

    #[test]
    fn test_forward_pushes_into_queue() {
        let queue = EventQueue::new();
        let mut translator = InputTranslator::new(2);
        assert_eq!(translator.forward(&cursor_moved(1.0, 1.0), &queue), Ok(1));
        assert_eq!(
            translator.forward(&WindowEvent::Ime(Ime::Enabled), &queue),
            Ok(0)
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_printable_text_filter() {
        assert!(is_printable("a"));
        assert!(!is_printable("\r"));
        assert!(!is_printable(""));
    }
}
