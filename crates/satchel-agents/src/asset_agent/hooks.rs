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

//! Adjustments applied to freshly loaded assets before they are registered.

use satchel_core::asset::{Asset, LoadedAsset};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A host-supplied adjustment of a loaded asset.
///
/// Hooks run inside the detached task that loaded the asset, after the load
/// completes and before the result is handed to the registry. They see the
/// payload while it is still uniquely owned.
pub trait PostLoadHook: Send + Sync {
    /// Whether this hook wants to see `asset_name` loaded out of `bundle_name`.
    fn applies_to(&self, bundle_name: &str, asset_name: &str) -> bool;

    /// Adjusts the payload in place.
    fn apply(&self, asset: &mut dyn Asset);
}

/// A hook targeting a single asset name and concrete type.
///
/// Payloads of any other type under that name are left untouched.
pub struct NamedAssetHook<A, F> {
    asset_name: String,
    adjust: F,
    _asset: PhantomData<fn(&mut A)>,
}

impl<A, F> NamedAssetHook<A, F>
where
    A: Asset,
    F: Fn(&mut A) + Send + Sync + 'static,
{
    /// Creates a hook calling `adjust` on every `A` loaded as `asset_name`.
    pub fn new(asset_name: impl Into<String>, adjust: F) -> Self {
        Self {
            asset_name: asset_name.into(),
            adjust,
            _asset: PhantomData,
        }
    }
}

impl<A, F> PostLoadHook for NamedAssetHook<A, F>
where
    A: Asset,
    F: Fn(&mut A) + Send + Sync + 'static,
{
    fn applies_to(&self, _bundle_name: &str, asset_name: &str) -> bool {
        asset_name == self.asset_name
    }

    fn apply(&self, asset: &mut dyn Asset) {
        if let Some(asset) = asset.as_any_mut().downcast_mut::<A>() {
            (self.adjust)(asset);
        }
    }
}

/// The ordered set of hooks given to every detached load.
///
/// Cloning is cheap: hooks are shared behind `Arc`s.
#[derive(Clone, Default)]
pub struct PostLoadHookRegistry {
    hooks: Vec<Arc<dyn PostLoadHook>>,
}

impl PostLoadHookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook. Hooks run in registration order.
    pub fn register(&mut self, hook: impl PostLoadHook + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every matching hook over a loaded asset. Returns how many ran.
    ///
    /// Null loads are skipped.
    pub fn apply(&self, bundle_name: &str, loaded: &mut LoadedAsset) -> usize {
        let name = loaded.name().to_owned();
        let Some(payload) = loaded.payload_mut() else {
            return 0;
        };

        let mut applied = 0;
        for hook in self
            .hooks
            .iter()
            .filter(|hook| hook.applies_to(bundle_name, &name))
        {
            hook.apply(payload);
            applied += 1;
        }

        if applied > 0 {
            log::debug!("Applied {applied} post-load hook(s) to \"{name}\" from bundle \"{bundle_name}\"");
        }
        applied
    }
}

impl fmt::Debug for PostLoadHookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostLoadHookRegistry")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
