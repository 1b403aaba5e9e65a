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

//! Core types for runtime-typed, named assets.
//!
//! Every payload the registry stores implements [`Asset`]. Payloads are kept
//! type-erased behind `Arc<dyn Asset>` and recovered through [`AssetType`]
//! (a runtime type tag) plus a downcast when a caller asks for a concrete type.

mod error;
mod filter;
mod handle;
mod loader;
mod resource;

pub use error::*;
pub use filter::*;
pub use handle::*;
pub use loader::*;
pub use resource::*;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erasure helpers implemented for every `Send + Sync + 'static` type.
///
/// This is a supertrait of [`Asset`] so that a `dyn Asset` can be turned back
/// into its concrete type.
pub trait AsAny: Any + Send + Sync {
    /// Borrows `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Borrows `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Converts a shared pointer into an `Arc<dyn Any>` suitable for `Arc::downcast`.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A marker trait for types that can be stored in the asset registry.
///
/// The payload is owned by the host once a load returns it. The default
/// implementations describe a plain asset that needs no explicit teardown and
/// is not a pooled template.
pub trait Asset: AsAny {
    /// Immediately releases whatever host-side memory backs this asset.
    ///
    /// Called by the registry during teardown instead of waiting for the last
    /// `Arc` to be dropped.
    fn destroy(&self) {}

    /// Returns the pooled-template view of this asset, if it is one.
    fn as_template(&self) -> Option<&dyn PooledTemplate> {
        None
    }
}

/// A reusable template that spawns pooled instances (e.g. a prefab).
pub trait PooledTemplate: Send + Sync {
    /// Whether the template is currently marked active / in use.
    fn is_active(&self) -> bool;

    /// Returns every spawned instance of this template to its pool.
    fn recycle_all(&self);
}

/// A runtime type tag identifying the concrete type behind a stored asset.
///
/// Equality and hashing only consider the `TypeId`; the type name is carried
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct AssetType {
    id: TypeId,
    name: &'static str,
}

impl AssetType {
    /// Returns the tag for the concrete asset type `A`.
    pub fn of<A: Asset>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    /// The `TypeId` of the tagged type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The full type name of the tagged type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path (`my_game::Prefab` -> `Prefab`).
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for AssetType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AssetType {}

impl Hash for AssetType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetType({})", self.name)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
