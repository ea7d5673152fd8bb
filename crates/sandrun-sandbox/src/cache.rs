//! Local view of the Nanvix registry cache (`~/.cache/nanvix-registry`).
//!
//! The runner downloads guest interpreters and the kernel here on first use.
//! This module only inspects and clears the cache; it never downloads.

use std::path::{Path, PathBuf};

use crate::error::SandboxError;

/// Binaries the runner needs for every supported workload type
pub const REQUIRED_BINARIES: &[&str] = &["kernel.elf", "qjs", "python3"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCache {
    root: PathBuf,
}

impl Default for RegistryCache {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl RegistryCache {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// `$HOME/.cache/nanvix-registry`, or `./.cache/nanvix-registry` without a home dir
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cache")
            .join("nanvix-registry")
    }

    /// Use `override_root` when given, the default location otherwise.
    pub fn from_override(override_root: Option<PathBuf>) -> Self {
        override_root.map(Self::new).unwrap_or_default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Path of a cached binary, if present
    pub fn cached_binary_path(&self, binary_name: &str) -> Option<PathBuf> {
        let path = self.binary_dir().join(binary_name);
        path.is_file().then_some(path)
    }

    pub fn is_binary_cached(&self, binary_name: &str) -> bool {
        self.cached_binary_path(binary_name).is_some()
    }

    /// Cache state of every binary in [`REQUIRED_BINARIES`]
    pub fn status(&self) -> Vec<(&'static str, bool)> {
        REQUIRED_BINARIES
            .iter()
            .map(|name| (*name, self.is_binary_cached(name)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.status().iter().all(|(_, cached)| *cached)
    }

    /// Remove the whole cache so the runner downloads fresh binaries.
    pub fn clear(&self) -> Result<(), SandboxError> {
        tracing::info!(root = %self.root.display(), "Clearing nanvix registry cache");
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SandboxError::io(
                format!("failed to clear registry cache {}", self.root.display()),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_binary_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegistryCache::new(dir.path());
        std::fs::create_dir_all(cache.binary_dir()).unwrap();
        std::fs::write(cache.binary_dir().join("qjs"), b"guest").unwrap();

        assert_eq!(
            cache.cached_binary_path("qjs"),
            Some(dir.path().join("bin").join("qjs"))
        );
        assert!(!cache.is_binary_cached("python3"));
        assert_eq!(
            cache.status(),
            vec![("kernel.elf", false), ("qjs", true), ("python3", false)]
        );
        assert!(!cache.is_complete());
    }

    #[test]
    fn test_clear_removes_root_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegistryCache::new(dir.path().join("registry"));
        std::fs::create_dir_all(cache.binary_dir()).unwrap();
        std::fs::write(cache.binary_dir().join("kernel.elf"), b"k").unwrap();

        cache.clear().unwrap();
        assert!(!cache.root().exists());
        cache.clear().unwrap();
    }

    #[test]
    fn test_default_root_layout() {
        let root = RegistryCache::default_root();
        assert!(root.ends_with(".cache/nanvix-registry"));
        assert_eq!(RegistryCache::from_override(None).root(), root.as_path());
    }
}
