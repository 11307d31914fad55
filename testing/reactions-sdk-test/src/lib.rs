// Copyright 2026 The Matrix.org Foundation C.I.C.
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

//! Helpers to write tests for the reactions SDK.

pub mod test_json;

/// Install a `tracing` subscriber for the current test binary.
///
/// The filter is read from `RUST_LOG`, and defaults to `info`. Output goes
/// through the test writer, so it's only shown for failing tests.
#[macro_export]
macro_rules! init_tracing_for_tests {
    () => {
        #[$crate::__macro_support::ctor::ctor]
        fn init_logging() {
            use $crate::__macro_support::tracing_subscriber::{
                fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter, Registry,
            };

            Registry::default()
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .with(fmt::layer().with_test_writer())
                .init();
        }
    };
}

#[doc(hidden)]
pub mod __macro_support {
    pub use ctor;
    pub use tracing_subscriber;
}
