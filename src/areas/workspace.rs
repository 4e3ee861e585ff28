use anyhow::Context;
use std::path::{Path, PathBuf};

/// The working tree: the flat set of plain files at the repository root.
/// Subdirectories (including the state directory) are not tracked.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    /// Absolute path of a working-tree file.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Snapshot key of a working-tree file: its absolute path as a string.
    pub fn file_key(&self, name: &str) -> String {
        self.file_path(name).display().to_string()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    /// Sorted names of every plain file at the root.
    pub fn list_file_names(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&self.path)
            .with_context(|| format!("Unable to list working tree {}", self.path.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Write a file at its snapshot key, overwriting any previous content.
    pub fn write_key(&self, key: &str, content: &str) -> anyhow::Result<()> {
        std::fs::write(key, content)
            .with_context(|| format!("Unable to write working file {key}"))
    }

    /// Delete the plain file at a snapshot key, if it exists.
    pub fn remove_key(&self, key: &str) -> anyhow::Result<()> {
        let path = Path::new(key);
        if path.is_file() {
            std::fs::remove_file(path)
                .with_context(|| format!("Unable to delete working file {key}"))?;
        }

        Ok(())
    }

    /// Delete every plain file at the root, leaving directories alone.
    pub fn clear(&self) -> anyhow::Result<()> {
        for name in self.list_file_names()? {
            let path = self.file_path(&name);
            std::fs::remove_file(&path)
                .with_context(|| format!("Unable to delete working file {}", path.display()))?;
        }

        Ok(())
    }
}
