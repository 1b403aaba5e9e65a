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

use satchel_core::asset::LoadedAsset;
use satchel_core::bundle::{BundleError, BundleHandle};
use tokio::task::JoinError;

/// Completions reported by detached tasks back to the agent.
#[derive(Debug)]
pub(crate) enum LoadEvent {
    /// A per-asset load out of a manually opened bundle finished.
    Loaded {
        /// Registry generation the load was issued in.
        generation: u64,
        bundle: BundleHandle,
        path: String,
        /// `None` when the host produced nothing for the path.
        asset: Option<LoadedAsset>,
    },
    /// A bundle close finished.
    Closed {
        bundle: BundleHandle,
        result: Result<(), BundleError>,
    },
    /// A detached load or close panicked or was cancelled before reporting.
    Failed { what: String, error: JoinError },
}
