use crate::areas::index::{Index, file_name_of};
use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::errors::Abort;
use anyhow::Context;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

// Terminology:
// - untracked files: present in the working tree but neither staged nor
//   recorded in the current commit
// - modifications not staged: tracked or staged files whose working-tree
//   state no longer matches what the index or current commit recorded
impl Repository {
    pub fn status(&self) -> anyhow::Result<()> {
        let head = self.head_commit()?;
        let index = self.index()?;

        let branches = self.branch_listing()?;
        let staged = file_names(index.added().keys());
        let removed = file_names(index.removed().iter());
        let modified = self.unstaged_changes(&index, head.as_ref())?;
        let untracked = self.untracked_files()?;

        let mut writer = self.writer();
        writeln!(writer, "=== Branches ===")?;
        for name in branches {
            writeln!(writer, "{name}")?;
        }

        let sections = [
            ("=== Staged Files ===", staged),
            ("=== Removed Files ===", removed),
            ("=== Modifications Not Staged For Commit ===", modified),
            ("=== Untracked Files ===", untracked),
        ];
        for (header, names) in sections {
            writeln!(writer)?;
            writeln!(writer, "{header}")?;
            for name in names {
                writeln!(writer, "{name}")?;
            }
        }
        writeln!(writer)?;

        Ok(())
    }

    /// Names of working-tree files that are neither staged nor recorded in
    /// the current commit. Also used as the guard for the destructive
    /// whole-tree operations.
    pub(crate) fn untracked_files(&self) -> anyhow::Result<BTreeSet<String>> {
        let head = self.head_commit()?;
        let index = self.index()?;

        let mut untracked = BTreeSet::new();
        for name in self.workspace().list_file_names()? {
            let key = self.workspace().file_key(&name);
            if !index.is_tracked(&key, head.as_ref()) {
                untracked.insert(name);
            }
        }

        Ok(untracked)
    }

    pub(crate) fn ensure_no_untracked(&self) -> anyhow::Result<()> {
        if !self.untracked_files()?.is_empty() {
            anyhow::bail!(Abort::UntrackedInTheWay);
        }

        Ok(())
    }

    /// Current branch first, marked with `*`; the rest in sorted order.
    fn branch_listing(&self) -> anyhow::Result<Vec<String>> {
        let current = self.refs().read_head()?.disk_name();
        let mut listing = vec![format!("*{current}")];

        for name in self.refs().list_branch_names()? {
            if name != current {
                listing.push(name);
            }
        }

        Ok(listing)
    }

    /// Tracked or staged paths whose working-tree state drifted without
    /// being staged: deleted files, and files hashing differently from the
    /// blob the index (or, unstaged, the current commit) recorded.
    fn unstaged_changes(
        &self,
        index: &Index,
        head: Option<&Commit>,
    ) -> anyhow::Result<BTreeSet<String>> {
        let mut keys: BTreeSet<&String> = head
            .map(|commit| commit.snapshot().keys().collect())
            .unwrap_or_default();
        keys.extend(index.added().keys());

        let mut changes = BTreeSet::new();
        for key in keys {
            let name = file_name_of(key);
            let staged = index.added().get(key.as_str());

            if !Path::new(key.as_str()).is_file() {
                let head_tracked = head.and_then(|commit| commit.blob_for(key)).is_some();
                if staged.is_some() || (!index.is_removed(key) && head_tracked) {
                    changes.insert(format!("{name} (deleted)"));
                }
                continue;
            }

            let content = std::fs::read_to_string(key.as_str())
                .with_context(|| format!("Unable to read working file {key}"))?;
            let current_blob = Blob::hash_for(&name, &content);
            let recorded = staged.or_else(|| head.and_then(|commit| commit.blob_for(key)));
            if recorded != Some(&current_blob) {
                changes.insert(format!("{name} (modified)"));
            }
        }

        Ok(changes)
    }
}

fn file_names<'k>(keys: impl Iterator<Item = &'k String>) -> BTreeSet<String> {
    keys.map(|key| file_name_of(key)).collect()
}
