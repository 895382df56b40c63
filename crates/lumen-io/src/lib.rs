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

//! # Lumen IO
//!
//! Byte-stream backings and the bridge that presents them to the native
//! library as a `RawStream` function table.

#![warn(missing_docs)]

pub mod backing;
pub mod rwops;

pub use backing::{
    ConstStream, ContainerStream, FileMode, FileStream, FixedStream, ReaderStream, WriterStream,
};
pub use rwops::{RWops, RawStream};
