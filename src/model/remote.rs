use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::io::{self, Write};

/// A package resolved from a remote, identified only by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A source URL and the dependencies a lock file resolved from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub url: String,
    pub dependencies: BTreeMap<String, Dependency>,
}

impl Remote {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Adds a dependency, replacing any previous entry with the same name.
    pub fn add_dependency(&mut self, name: impl Into<String>) {
        let dependency = Dependency::new(name);
        self.dependencies.insert(dependency.name.clone(), dependency);
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}

/// Every remote found in a single lock file, keyed by URL.
///
/// A `RemoteMap` is owned by the parser that builds it. Dependency sets
/// only grow: registering a URL that is already known keeps whatever was
/// gathered for it so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteMap {
    remotes: BTreeMap<String, Remote>,
}

impl RemoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a remote with no dependencies if it isn't known yet.
    pub fn add_remote(&mut self, url: &str) -> &mut Remote {
        self.remotes
            .entry(url.to_string())
            .or_insert_with(|| Remote::new(url))
    }

    /// Adds a dependency under `url`, registering the remote on first use.
    pub fn add_dependency(&mut self, url: &str, name: &str) {
        self.add_remote(url).add_dependency(name);
    }

    pub fn get(&self, url: &str) -> Option<&Remote> {
        self.remotes.get(url)
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Remote> {
        self.remotes.values()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.remotes.keys().map(String::as_str)
    }

    /// Returns the URLs containing `pattern`, ignoring case.
    ///
    /// An empty pattern matches every URL.
    pub fn urls_matching(&self, pattern: &str) -> Vec<String> {
        if pattern.is_empty() {
            return self.remotes.keys().cloned().collect();
        }

        let pattern = pattern.to_lowercase();
        self.remotes
            .keys()
            .filter(|url| url.to_lowercase().contains(&pattern))
            .cloned()
            .collect()
    }

    /// Returns every URL other than `excluded_url` that resolved `dependency`.
    pub fn urls_with_dependency(&self, excluded_url: &str, dependency: &str) -> Vec<String> {
        self.remotes
            .values()
            .filter(|remote| remote.url != excluded_url && remote.has_dependency(dependency))
            .map(|remote| remote.url.clone())
            .collect()
    }

    /// Writes a human-readable listing of every remote and its dependencies.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        for remote in self.remotes.values() {
            writeln!(out, "{}", remote.url)?;
            if remote.dependencies.is_empty() {
                writeln!(out, "  (no dependencies)")?;
            }
            for name in remote.dependency_names() {
                writeln!(out, "  {}", name)?;
            }
            writeln!(out, "--------------------")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RemoteMap {
    type Item = &'a Remote;
    type IntoIter = btree_map::Values<'a, String, Remote>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RemoteMap {
        let mut remotes = RemoteMap::new();
        remotes.add_dependency("https://my-registry.example/", "foo");
        remotes.add_dependency("https://rubygems.org/", "foo");
        remotes.add_dependency("https://rubygems.org/", "rails");
        remotes.add_remote("https://github.com/acme/widget.git");
        remotes
    }

    #[test]
    fn test_add_remote_keeps_existing_dependencies() {
        let mut remotes = sample();
        remotes.add_remote("https://rubygems.org/");

        let remote = remotes.get("https://rubygems.org/").unwrap();
        assert!(remote.has_dependency("foo"));
        assert!(remote.has_dependency("rails"));
    }

    #[test]
    fn test_duplicate_dependency_overwrites() {
        let mut remotes = RemoteMap::new();
        remotes.add_dependency("https://rubygems.org/", "rake");
        remotes.add_dependency("https://rubygems.org/", "rake");

        assert_eq!(remotes.get("https://rubygems.org/").unwrap().dependencies.len(), 1);
    }

    #[test]
    fn test_urls_matching_is_case_insensitive() {
        let remotes = sample();

        assert_eq!(
            remotes.urls_matching("REGISTRY"),
            vec!["https://my-registry.example/".to_string()]
        );
        assert!(remotes.urls_matching("npmjs").is_empty());
    }

    #[test]
    fn test_urls_matching_empty_returns_all() {
        let remotes = sample();
        assert_eq!(remotes.urls_matching("").len(), 3);
    }

    #[test]
    fn test_urls_with_dependency_excludes_url() {
        let remotes = sample();

        assert_eq!(
            remotes.urls_with_dependency("https://my-registry.example/", "foo"),
            vec!["https://rubygems.org/".to_string()]
        );
        assert_eq!(remotes.urls_with_dependency("", "foo").len(), 2);
        assert!(remotes
            .urls_with_dependency("https://my-registry.example/", "missing")
            .is_empty());
    }

    #[test]
    fn test_dump_lists_every_remote() {
        let remotes = sample();
        let mut out = Vec::new();
        remotes.dump(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("https://rubygems.org/\n  foo\n  rails\n"));
        assert!(text.contains("https://github.com/acme/widget.git\n  (no dependencies)\n"));
    }
}
