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

//! Acts as the **[A]gent** for the asset registry.
//!
//! This module provides the orchestration that fills the registry from three
//! independently-timed sources: bundles the host already has open, bundles the
//! agent opens itself, and payloads shipped with the subsystem. The registry
//! and the bundle bookkeeping live in `satchel-data`; this module decides when
//! they are touched.

mod agent;
mod embedded;
mod events;
mod hooks;

pub use agent::AssetAgent;
pub use embedded::{EmbeddedLoadError, EmbeddedLoaderRegistry, EmbeddedResource};
pub use hooks::{NamedAssetHook, PostLoadHook, PostLoadHookRegistry};
