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

//! # Lumen Infra
//!
//! Concrete implementations of the core contracts: the event queue that
//! serves as the application's event source, the `winit` input translator
//! and the logger bootstrap.

#![warn(missing_docs)]

pub mod event_queue;
pub mod logging;
#[cfg(feature = "platform")]
pub mod platform;

pub use event_queue::EventQueue;
pub use logging::init_logging;
#[cfg(feature = "platform")]
pub use platform::{translate_winit_event, InputTranslator};
