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

//! Error types and the ambient "last error" string.
//!
//! The native library reports recoverable failures by returning a sentinel
//! (`0`, `-1`) and storing a message in a per-thread error slot. The
//! functions in this module reproduce that slot so that stream backings and
//! trampolines can report failures the same way, while the typed
//! [`LumenError`] is used wherever a `Result` can be returned.

use crate::event::EventError;
use crate::optional::BadOptionalAccess;
use crate::stream::StreamError;
use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Stores `message` as the calling thread's last error.
pub fn set_error(message: impl Into<String>) {
    let message = message.into();
    log::trace!("Ambient error set: {message}");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = message);
}

/// Returns a copy of the calling thread's last error, or an empty string.
pub fn get_error() -> String {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Clears the calling thread's last error.
pub fn clear_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().clear());
}

/// The top-level error type of the wrapper layer.
#[derive(Debug, thiserror::Error)]
pub enum LumenError {
    /// A failure reported through the ambient error string.
    #[error("{0}")]
    Native(String),
    /// A byte-stream failure.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// An event-source failure.
    #[error(transparent)]
    Event(#[from] EventError),
    /// An empty [`Optional`](crate::Optional) was accessed.
    #[error(transparent)]
    BadOptionalAccess(#[from] BadOptionalAccess),
}

impl LumenError {
    /// Builds an error from the calling thread's last error message.
    pub fn from_last_error() -> Self {
        Self::Native(get_error())
    }
}
