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

//! Logger bootstrap.

use env_logger::{Builder, Env};

/// Installs the global `env_logger` logger.
///
/// `RUST_LOG` wins over `default_filter`. Returns `false` if a logger was
/// already installed, which is not an error: tests and host applications
/// commonly install their own first.
pub fn init_logging(default_filter: &str) -> bool {
    let installed = Builder::from_env(Env::default().default_filter_or(default_filter))
        .filter_module("winit", log::LevelFilter::Warn)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("Logger initialized with default filter '{default_filter}'.");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_logging("debug");
        assert!(!init_logging("trace"));
    }
}
