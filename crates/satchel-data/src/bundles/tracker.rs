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

use satchel_core::bundle::BundleHandle;

/// The set of bundles this subsystem opened itself and must eventually close.
///
/// Bundles the host opened on its own never enter the tracker; the agent only
/// tracks handles returned by its own open requests.
#[derive(Debug, Default)]
pub struct BundleTracker {
    bundles: Vec<BundleHandle>,
}

impl BundleTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a manually opened bundle. Returns `false` for a handle that is
    /// already tracked.
    pub fn track(&mut self, bundle: BundleHandle) -> bool {
        if self.bundles.iter().any(|tracked| tracked.id() == bundle.id()) {
            log::warn!(
                "Bundle \"{}\" ({}) is already tracked as manually loaded",
                bundle.name(),
                bundle.id()
            );
            return false;
        }
        log::debug!("Tracking manually loaded bundle \"{}\"", bundle.name());
        self.bundles.push(bundle);
        true
    }

    /// Whether a tracked bundle carries this name.
    pub fn contains_name(&self, name: &str) -> bool {
        self.bundles.iter().any(|bundle| bundle.name() == name)
    }

    /// Iterates the tracked bundles in the order they were opened.
    pub fn iter(&self) -> impl Iterator<Item = &BundleHandle> {
        self.bundles.iter()
    }

    /// Number of tracked bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Takes every tracked handle, leaving the tracker empty.
    pub fn drain(&mut self) -> Vec<BundleHandle> {
        std::mem::take(&mut self.bundles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::bundle::BundleId;

    #[test]
    fn tracks_in_open_order() {
        let mut tracker = BundleTracker::new();
        assert!(tracker.track(BundleHandle::new(BundleId(2), "b2")));
        assert!(tracker.track(BundleHandle::new(BundleId(1), "b1")));

        let names: Vec<_> = tracker.iter().map(BundleHandle::name).collect();
        assert_eq!(names, ["b2", "b1"]);
        assert!(tracker.contains_name("b1"));
        assert!(!tracker.contains_name("b3"));
    }

    #[test]
    fn duplicate_handle_is_ignored() {
        let mut tracker = BundleTracker::new();
        let handle = BundleHandle::new(BundleId(1), "b1");
        assert!(tracker.track(handle.clone()));
        assert!(!tracker.track(handle));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn drain_empties_the_set() {
        let mut tracker = BundleTracker::new();
        tracker.track(BundleHandle::new(BundleId(1), "b1"));
        tracker.track(BundleHandle::new(BundleId(2), "b2"));

        let drained = tracker.drain();
        assert_eq!(drained.len(), 2);
        assert!(tracker.is_empty());
        assert!(tracker.drain().is_empty());
    }
}
