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

use satchel_core::asset::{
    Asset, AssetHandle, AssetType, LookupError, PooledTemplate, ResourceHandle,
};
use std::collections::HashMap;

/// What [`AssetRegistry::try_add`] did with the offered resource.
///
/// Purely informational: the registry already logged the outcome, and callers
/// are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Added to an existing bucket for its type.
    Inserted,
    /// Added as the first entry of a new bucket for its type.
    InsertedNewType,
    /// Filled a key that was reserved by a null placeholder.
    ReplacedPlaceholder,
    /// A null resource reserved a previously unknown key.
    Reserved,
    /// A null resource for a key that already exists; nothing changed.
    Ignored,
    /// The name is already populated somewhere in the registry; first writer wins.
    Conflict,
}

impl AddOutcome {
    /// Whether the registry now holds the offered payload.
    pub fn is_populated(self) -> bool {
        matches!(
            self,
            AddOutcome::Inserted | AddOutcome::InsertedNewType | AddOutcome::ReplacedPlaceholder
        )
    }
}

type Bucket = HashMap<String, ResourceHandle>;

/// A heterogeneous cache of assets keyed by runtime type, then by name.
///
/// Names are unique across the whole registry, not only within one type:
/// offering a second asset under a name that is already populated is
/// rejected, whatever its type. A key may also hold a null placeholder, which
/// reserves the name without counting as present.
///
/// The registry has no interior locking. It is owned by a single writer, and
/// every method runs to completion before another can observe the maps.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    buckets: HashMap<AssetType, Bucket>,
    /// Bumped by every teardown so late completions can be recognised.
    generation: u64,
}

impl AssetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a resource to the registry.
    ///
    /// A populated resource is inserted unless its name is already populated
    /// anywhere in the registry. A null resource only reserves its key (see
    /// [`reserve`](Self::reserve)).
    pub fn try_add(&mut self, resource: ResourceHandle) -> AddOutcome {
        let asset_type = resource.asset_type();

        if resource.is_null() {
            return if self.reserve(asset_type, resource.name()) {
                AddOutcome::Reserved
            } else {
                log::debug!(
                    "Ignoring null asset \"{}\" of type \"{asset_type}\"; its key already exists",
                    resource.name()
                );
                AddOutcome::Ignored
            };
        }

        if self.has(resource.name()) {
            log::warn!("Asset \"{}\" has already been loaded!", resource.name());
            return AddOutcome::Conflict;
        }

        match self.buckets.get_mut(&asset_type) {
            Some(bucket) => match bucket.get_mut(resource.name()) {
                // Unreachable while `has` guards above.
                Some(existing) if !existing.is_null() => {
                    log::warn!(
                        "There is already an asset \"{}\" of type \"{asset_type}\"!",
                        resource.name()
                    );
                    AddOutcome::Conflict
                }
                Some(existing) => {
                    log::info!(
                        "Key \"{}\" for assets of type \"{asset_type}\" exists, but its value is null; replacing with new asset...",
                        resource.name()
                    );
                    *existing = resource;
                    AddOutcome::ReplacedPlaceholder
                }
                None => {
                    log::debug!(
                        "Adding asset \"{}\" of type \"{asset_type}\".",
                        resource.name()
                    );
                    bucket.insert(resource.name().to_owned(), resource);
                    AddOutcome::Inserted
                }
            },
            None => {
                log::debug!(
                    "Added new bucket of type \"{asset_type}\" with initial asset \"{}\".",
                    resource.name()
                );
                let mut bucket = Bucket::new();
                bucket.insert(resource.name().to_owned(), resource);
                self.buckets.insert(asset_type, bucket);
                AddOutcome::InsertedNewType
            }
        }
    }

    /// Reserves (`asset_type`, `name`) with a null placeholder.
    ///
    /// Returns `false` without touching the registry when the key already
    /// exists or the name is populated under any type.
    pub fn reserve(&mut self, asset_type: AssetType, name: &str) -> bool {
        if self.has(name) {
            return false;
        }
        let bucket = self.buckets.entry(asset_type).or_default();
        if bucket.contains_key(name) {
            return false;
        }
        log::debug!("Reserving asset \"{name}\" of type \"{asset_type}\" with a null placeholder.");
        bucket.insert(name.to_owned(), ResourceHandle::placeholder(asset_type, name));
        true
    }

    /// Whether any type holds a populated entry called `name`.
    ///
    /// Null placeholders do not count.
    pub fn has(&self, name: &str) -> bool {
        self.buckets
            .values()
            .filter_map(|bucket| bucket.get(name))
            .any(|handle| !handle.is_null())
    }

    /// Looks up the entry for (`T`, `name`) and returns a typed handle.
    ///
    /// Every failure is logged at error level; the returned [`LookupError`]
    /// tells which of the causes applied.
    pub fn try_get<T: Asset>(&self, name: &str) -> Result<AssetHandle<T>, LookupError> {
        let asset_type = AssetType::of::<T>();
        let result = self.lookup(asset_type, name).and_then(|handle| {
            handle.downcast::<T>().ok_or_else(|| LookupError::TypeMismatch {
                name: name.to_owned(),
                type_name: asset_type.name(),
            })
        });

        if let Err(err) = &result {
            log::error!("{err}");
        }
        result
    }

    /// Like [`try_get`](Self::try_get), discarding the failure cause.
    pub fn get<T: Asset>(&self, name: &str) -> Option<AssetHandle<T>> {
        self.try_get::<T>(name).ok()
    }

    /// Finds the populated entry for a key without downcasting it.
    pub fn lookup(&self, asset_type: AssetType, name: &str) -> Result<&ResourceHandle, LookupError> {
        let bucket = self
            .buckets
            .get(&asset_type)
            .ok_or(LookupError::TypeNotRegistered {
                type_name: asset_type.name(),
            })?;

        let handle = bucket.get(name).ok_or_else(|| LookupError::NameNotFound {
            name: name.to_owned(),
            type_name: asset_type.name(),
        })?;

        if handle.is_null() {
            return Err(LookupError::Unpopulated {
                name: name.to_owned(),
                type_name: asset_type.name(),
            });
        }
        Ok(handle)
    }

    /// Destroys every stored payload immediately and empties the registry.
    ///
    /// Also advances the [`generation`](Self::generation), so results of loads
    /// issued before this call can be told apart from newer ones. Calling it
    /// on an empty registry leaves the contents unchanged.
    pub fn unload_all(&mut self) {
        let count = self.len();
        for handle in self.buckets.values().flat_map(|bucket| bucket.values()) {
            handle.destroy();
        }
        self.buckets.clear();
        self.generation += 1;

        if count > 0 {
            log::info!("Unloaded {count} assets.");
        }
    }

    /// The current teardown epoch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of entries, placeholders included.
    pub fn len(&self) -> usize {
        self.buckets.values().map(HashMap::len).sum()
    }

    /// Whether the registry holds no entry at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of types with a bucket.
    pub fn type_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterates every entry, placeholders included, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.buckets.values().flat_map(|bucket| bucket.values())
    }

    /// Iterates the populated entries whose payload is a pooled template.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &dyn PooledTemplate)> {
        self.iter().filter_map(|handle| {
            let template = handle.payload()?.as_template()?;
            Some((handle.name(), template))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Prefab {
        pool_size: usize,
    }
    impl Asset for Prefab {}

    #[derive(Debug, PartialEq)]
    struct AudioClip {
        seconds: u32,
    }
    impl Asset for AudioClip {}

    struct Counted {
        destroyed: Arc<AtomicUsize>,
    }
    impl Asset for Counted {
        fn destroy(&self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Spawner {
        active: bool,
        recycled: AtomicBool,
    }
    impl PooledTemplate for Spawner {
        fn is_active(&self) -> bool {
            self.active
        }
        fn recycle_all(&self) {
            self.recycled.store(true, Ordering::SeqCst);
        }
    }
    impl Asset for Spawner {
        fn as_template(&self) -> Option<&dyn PooledTemplate> {
            Some(self)
        }
    }

    #[test]
    fn added_resource_is_found_by_type_and_name() {
        let mut registry = AssetRegistry::new();
        let outcome = registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 6 }));
        assert_eq!(outcome, AddOutcome::InsertedNewType);

        let prefab = registry.try_get::<Prefab>("Glob").unwrap();
        assert_eq!(prefab.pool_size, 6);
        assert!(registry.has("Glob"));
    }

    #[test]
    fn second_entry_of_a_type_reuses_the_bucket() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("a", Prefab { pool_size: 1 }));
        assert_eq!(
            registry.try_add(ResourceHandle::new("b", Prefab { pool_size: 2 })),
            AddOutcome::Inserted
        );
        assert_eq!(registry.type_count(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unregistered_type_is_reported() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 6 }));

        let err = registry.try_get::<AudioClip>("Glob").unwrap_err();
        assert!(matches!(err, LookupError::TypeNotRegistered { .. }));
        assert!(registry.get::<AudioClip>("Glob").is_none());
    }

    #[test]
    fn missing_name_is_reported() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 6 }));

        let err = registry.try_get::<Prefab>("Spit").unwrap_err();
        assert_eq!(
            err,
            LookupError::NameNotFound {
                name: "Spit".into(),
                type_name: AssetType::of::<Prefab>().name(),
            }
        );
    }

    #[test]
    fn placeholder_is_reported_as_unpopulated() {
        let mut registry = AssetRegistry::new();
        assert!(registry.reserve(AssetType::of::<Prefab>(), "Glob"));

        let err = registry.try_get::<Prefab>("Glob").unwrap_err();
        assert!(matches!(err, LookupError::Unpopulated { .. }));
        assert!(!registry.has("Glob"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn placeholder_is_filled_by_a_later_add() {
        let mut registry = AssetRegistry::new();
        let outcome = registry.try_add(ResourceHandle::placeholder(AssetType::of::<Prefab>(), "Glob"));
        assert_eq!(outcome, AddOutcome::Reserved);
        assert!(!registry.has("Glob"));

        let outcome = registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 3 }));
        assert_eq!(outcome, AddOutcome::ReplacedPlaceholder);
        assert!(outcome.is_populated());
        assert!(registry.has("Glob"));
        assert_eq!(registry.try_get::<Prefab>("Glob").unwrap().pool_size, 3);
    }

    #[test]
    fn null_never_overwrites_a_populated_entry() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 3 }));

        let outcome = registry.try_add(ResourceHandle::placeholder(AssetType::of::<Prefab>(), "Glob"));
        assert_eq!(outcome, AddOutcome::Ignored);
        assert!(!registry.reserve(AssetType::of::<AudioClip>(), "Glob"));
        assert!(registry.try_get::<Prefab>("Glob").is_ok());
        assert_eq!(registry.type_count(), 1);
    }

    #[test]
    fn duplicate_name_in_same_type_keeps_first() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 1 }));
        let outcome = registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 2 }));

        assert_eq!(outcome, AddOutcome::Conflict);
        assert_eq!(registry.try_get::<Prefab>("Glob").unwrap().pool_size, 1);
    }

    #[test]
    fn duplicate_name_across_types_keeps_first() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new("Spit", Prefab { pool_size: 1 }));
        let outcome = registry.try_add(ResourceHandle::new("Spit", AudioClip { seconds: 2 }));

        assert_eq!(outcome, AddOutcome::Conflict);
        assert!(registry.try_get::<Prefab>("Spit").is_ok());
        assert!(matches!(
            registry.try_get::<AudioClip>("Spit"),
            Err(LookupError::TypeNotRegistered { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unload_all_destroys_everything_once() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let mut registry = AssetRegistry::new();
        for name in ["a", "b", "c"] {
            registry.try_add(ResourceHandle::new(
                name,
                Counted {
                    destroyed: destroyed.clone(),
                },
            ));
        }
        registry.reserve(AssetType::of::<Prefab>(), "pending");
        let before = registry.generation();

        registry.unload_all();
        assert_eq!(destroyed.load(Ordering::SeqCst), 3);
        assert!(registry.is_empty());
        assert_eq!(registry.type_count(), 0);
        assert!(registry.generation() > before);
        assert!(matches!(
            registry.try_get::<Counted>("a"),
            Err(LookupError::TypeNotRegistered { .. })
        ));

        registry.unload_all();
        assert_eq!(destroyed.load(Ordering::SeqCst), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn templates_only_yields_pooled_payloads() {
        let mut registry = AssetRegistry::new();
        registry.try_add(ResourceHandle::new(
            "Tendril",
            Spawner {
                active: true,
                recycled: AtomicBool::new(false),
            },
        ));
        registry.try_add(ResourceHandle::new("Glob", Prefab { pool_size: 1 }));
        registry.reserve(AssetType::of::<Spawner>(), "Pending");

        let templates: Vec<_> = registry.templates().collect();
        assert_eq!(templates.len(), 1);
        let (name, template) = templates[0];
        assert_eq!(name, "Tendril");
        assert!(template.is_active());
        template.recycle_all();

        let spawner = registry.try_get::<Spawner>("Tendril").unwrap();
        assert!(spawner.recycled.load(Ordering::SeqCst));
    }
}
