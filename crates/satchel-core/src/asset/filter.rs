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

//! Selection of interesting assets out of a bundle's full path list.

/// Matches asset paths against the desired-name allow-list.
///
/// Matching is by substring, not by exact name: an asset path is selected
/// when it contains one of the desired names. When several names match the
/// same path, the longest one wins, and ties go to the name listed first.
/// One path therefore maps to at most one desired name.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    names: Vec<String>,
    /// Lowercased copies of `names`, only filled when matching ignores case.
    folded: Option<Vec<String>>,
}

impl NameFilter {
    /// Builds a case-sensitive filter. Empty names are dropped since they
    /// would match every path.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        Self {
            names,
            folded: None,
        }
    }

    /// Switches ASCII case-insensitive matching on or off.
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.folded = ignore.then(|| {
            self.names
                .iter()
                .map(|name| name.to_ascii_lowercase())
                .collect()
        });
        self
    }

    /// The desired names, in configuration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether no desired name is configured.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the desired name selecting `path`, if any.
    pub fn match_path(&self, path: &str) -> Option<&str> {
        let (haystack, needles) = match &self.folded {
            Some(folded) => (path.to_ascii_lowercase(), folded),
            None => (path.to_owned(), &self.names),
        };

        let mut best: Option<usize> = None;
        for (index, needle) in needles.iter().enumerate() {
            if !haystack.contains(needle.as_str()) {
                continue;
            }
            match best {
                Some(current) if needles[current].len() >= needle.len() => {}
                _ => best = Some(index),
            }
        }

        best.map(|index| self.names[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_match_selects_path() {
        let filter = NameFilter::new(["X_bar"]);
        assert_eq!(filter.match_path("foo/X_bar"), Some("X_bar"));
        assert_eq!(filter.match_path("foo/X_bar.prefab"), Some("X_bar"));
        assert_eq!(filter.match_path("foo/Y_bar"), None);
    }

    #[test]
    fn longest_match_wins() {
        let filter = NameFilter::new(["Glob", "Abyss Vomit Glob", "Vomit"]);
        assert_eq!(
            filter.match_path("assets/abyss/Abyss Vomit Glob.prefab"),
            Some("Abyss Vomit Glob")
        );
        assert_eq!(filter.match_path("assets/Glob.prefab"), Some("Glob"));
    }

    #[test]
    fn equal_length_tie_goes_to_first_listed() {
        let filter = NameFilter::new(["spit", "mini"]);
        assert_eq!(filter.match_path("mini_mawlek_spit"), Some("spit"));
    }

    #[test]
    fn case_sensitivity_is_configurable() {
        let strict = NameFilter::new(["Ground Tendril"]);
        assert_eq!(strict.match_path("assets/ground tendril.prefab"), None);

        let relaxed = NameFilter::new(["Ground Tendril"]).ignore_case(true);
        assert_eq!(
            relaxed.match_path("assets/ground tendril.prefab"),
            Some("Ground Tendril")
        );
    }

    #[test]
    fn empty_names_are_ignored() {
        let filter = NameFilter::new(["", "X"]);
        assert_eq!(filter.names(), ["X".to_string()]);
        assert_eq!(filter.match_path("anything"), None);
        assert!(NameFilter::new(Vec::<String>::new()).is_empty());
    }
}
