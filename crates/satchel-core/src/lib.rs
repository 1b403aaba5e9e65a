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

//! # Satchel Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by the asset registry, the agents that populate it, and the host
//! integrations that feed it bundles.

#![warn(missing_docs)]

pub mod asset;
pub mod bundle;
pub mod config;
pub mod event;
pub mod platform;

pub use asset::{Asset, AssetHandle, AssetType, LoadedAsset, ResourceHandle};
pub use bundle::{BundleError, BundleHandle, BundleId, BundleSource};
pub use config::AssetConfig;
