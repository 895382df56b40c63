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

//! # Lumen Core
//!
//! Foundational crate containing the optional value, the tagged event model,
//! the compile-time event dispatch engine and the byte-stream contracts that
//! the rest of the wrapper layer is built on.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod optional;
pub mod settings;
pub mod stream;

pub use error::{clear_error, get_error, set_error, LumenError};
pub use optional::{BadOptionalAccess, Nothing, Optional, NOTHING};
pub use settings::LumenSettings;
