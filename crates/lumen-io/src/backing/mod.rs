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

//! Concrete [`StreamBacking`](lumen_core::stream::StreamBacking) implementations.
//!
//! * [`ContainerStream`]: a growable `Vec<u8>`, owned or borrowed.
//! * [`ConstStream`]: read-only bytes; writes always fail.
//! * [`FixedStream`]: a fixed mutable region; writes cannot grow it.
//! * [`ReaderStream`] / [`WriterStream`]: `std::io` streams, one direction each.
//! * [`FileStream`]: a file opened with a C-style mode string.

mod container;
mod file;
mod io_stream;

pub use self::container::{ConstStream, ContainerStream, FixedStream};
pub use self::file::{FileMode, FileStream};
pub use self::io_stream::{ReaderStream, WriterStream};
