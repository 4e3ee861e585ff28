//! The remote registry.
//!
//! Maps remote names to the filesystem path of another repository's state
//! directory. No connection is kept open; push and fetch reopen the target
//! store through this registry every time.

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Remotes {
    path: Box<Path>,
    entries: BTreeMap<String, PathBuf>,
}

impl Remotes {
    /// Read the registry file; an absent file is an empty registry.
    pub fn load(path: Box<Path>) -> anyhow::Result<Self> {
        let mut remotes = Remotes {
            path,
            entries: BTreeMap::new(),
        };

        if !remotes.path.exists() {
            return Ok(remotes);
        }

        let content = std::fs::read_to_string(&remotes.path).with_context(|| {
            format!(
                "Unable to read remote registry at {}",
                remotes.path.display()
            )
        })?;
        for line in content.lines() {
            if let Some(entry) = line.strip_prefix("remote ") {
                let (name, path) = entry
                    .split_once(' ')
                    .context("Invalid remote entry: missing path")?;
                remotes
                    .entries
                    .insert(name.to_string(), PathBuf::from(path));
            } else if !line.is_empty() {
                anyhow::bail!("Invalid remote entry: {line:?}");
            }
        }

        Ok(remotes)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let mut content = String::new();
        for (name, path) in &self.entries {
            content.push_str(&format!("remote {} {}\n", name, path.display()));
        }

        std::fs::write(&self.path, content).with_context(|| {
            format!("Unable to write remote registry at {}", self.path.display())
        })
    }

    /// Register a remote. Returns false when the name is already taken.
    pub fn add(&mut self, name: &str, path: PathBuf) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }

        self.entries.insert(name.to_string(), path);
        true
    }

    /// Forget a remote. Returns false when the name is unknown.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&PathBuf> {
        self.entries.get(name)
    }
}
