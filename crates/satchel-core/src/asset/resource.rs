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

//! Type-erased resources as they travel from a load into the registry.

use super::{Asset, AssetHandle, AssetType};
use std::fmt;
use std::sync::Arc;

/// A named, runtime-typed entry of the registry.
///
/// A handle whose payload is `None` is a *null placeholder*: its key is
/// reserved but nothing is stored under it yet. This is distinct from the key
/// not existing at all.
#[derive(Clone)]
pub struct ResourceHandle {
    asset_type: AssetType,
    name: String,
    payload: Option<Arc<dyn Asset>>,
}

impl ResourceHandle {
    /// Creates a populated handle for `asset`.
    pub fn new<A: Asset>(name: impl Into<String>, asset: A) -> Self {
        Self {
            asset_type: AssetType::of::<A>(),
            name: name.into(),
            payload: Some(Arc::new(asset)),
        }
    }

    /// Creates a null placeholder for the key (`asset_type`, `name`).
    pub fn placeholder(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
            payload: None,
        }
    }

    /// The runtime type tag of the entry.
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// The name the entry is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored payload, or `None` for a placeholder.
    pub fn payload(&self) -> Option<&Arc<dyn Asset>> {
        self.payload.as_ref()
    }

    /// Whether this handle is a null placeholder.
    pub fn is_null(&self) -> bool {
        self.payload.is_none()
    }

    /// Recovers a typed handle if the payload is present and of type `T`.
    pub fn downcast<T: Asset>(&self) -> Option<AssetHandle<T>> {
        let payload = Arc::clone(self.payload.as_ref()?);
        payload
            .into_any_arc()
            .downcast::<T>()
            .ok()
            .map(AssetHandle::from_arc)
    }

    /// Forces the payload's host-side teardown. Placeholders are ignored.
    pub fn destroy(&self) {
        if let Some(payload) = &self.payload {
            payload.destroy();
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("asset_type", &self.asset_type)
            .field("name", &self.name)
            .field("populated", &self.payload.is_some())
            .finish()
    }
}

/// The result of loading one asset out of a bundle or an embedded payload.
///
/// The payload is uniquely owned until it is registered, which lets post-load
/// hooks adjust the freshly loaded object in place.
pub struct LoadedAsset {
    asset_type: AssetType,
    name: String,
    payload: Option<Box<dyn Asset>>,
}

impl LoadedAsset {
    /// Wraps a successfully loaded asset.
    pub fn new<A: Asset>(name: impl Into<String>, asset: A) -> Self {
        Self {
            asset_type: AssetType::of::<A>(),
            name: name.into(),
            payload: Some(Box::new(asset)),
        }
    }

    /// A load that resolved to a null value for a known key.
    pub fn null(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
            payload: None,
        }
    }

    /// The runtime type tag of the loaded value.
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// The asset's own name (not its path inside the bundle).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the load resolved to a null value.
    pub fn is_null(&self) -> bool {
        self.payload.is_none()
    }

    /// Borrows the payload mutably, e.g. for a post-load adjustment.
    pub fn payload_mut(&mut self) -> Option<&mut (dyn Asset + 'static)> {
        self.payload.as_deref_mut()
    }

    /// Borrows the payload as its concrete type.
    pub fn downcast_mut<T: Asset>(&mut self) -> Option<&mut T> {
        self.payload_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Forces the payload's host-side teardown without registering it.
    pub fn destroy(&self) {
        if let Some(payload) = &self.payload {
            payload.destroy();
        }
    }

    /// Converts the load result into a registry entry.
    pub fn into_handle(self) -> ResourceHandle {
        ResourceHandle {
            asset_type: self.asset_type,
            name: self.name,
            payload: self.payload.map(Arc::from),
        }
    }
}

impl fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedAsset")
            .field("asset_type", &self.asset_type)
            .field("name", &self.name)
            .field("null", &self.payload.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, PartialEq)]
    struct Clip {
        length: u32,
    }
    impl Asset for Clip {}

    struct Sprite;
    impl Asset for Sprite {}

    #[derive(Default)]
    struct Tracked {
        destroyed: AtomicBool,
    }
    impl Asset for Tracked {
        fn destroy(&self) {
            self.destroyed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn downcast_recovers_concrete_type() {
        let handle = ResourceHandle::new("hit", Clip { length: 3 });
        let clip = handle.downcast::<Clip>().expect("payload should be a Clip");
        assert_eq!(clip.length, 3);
        assert!(handle.downcast::<Sprite>().is_none());
    }

    #[test]
    fn placeholder_has_no_payload() {
        let handle = ResourceHandle::placeholder(AssetType::of::<Clip>(), "hit");
        assert!(handle.is_null());
        assert!(handle.downcast::<Clip>().is_none());
        // Destroying a placeholder is a no-op.
        handle.destroy();
    }

    #[test]
    fn loaded_asset_can_be_adjusted_before_registration() {
        let mut loaded = LoadedAsset::new("hit", Clip { length: 1 });
        loaded.downcast_mut::<Clip>().unwrap().length = 7;

        let handle = loaded.into_handle();
        assert_eq!(handle.name(), "hit");
        assert_eq!(handle.asset_type(), AssetType::of::<Clip>());
        assert_eq!(handle.downcast::<Clip>().unwrap().length, 7);
    }

    #[test]
    fn destroy_reaches_the_payload() {
        let handle = ResourceHandle::new("t", Tracked::default());
        handle.destroy();
        let tracked = handle.downcast::<Tracked>().unwrap();
        assert!(tracked.destroyed.load(Ordering::SeqCst));
    }

    #[test]
    fn null_load_converts_to_placeholder() {
        let loaded = LoadedAsset::null(AssetType::of::<Clip>(), "gone");
        assert!(loaded.is_null());
        assert!(loaded.into_handle().is_null());
    }
}
