//! The staging area.
//!
//! The index is the single mutable bridge between the working tree and the
//! next commit: paths staged for addition (with the blob they were staged
//! at), paths staged for removal, and tracked-but-not-yet-committed
//! bookkeeping. It is read in full, mutated in memory and rewritten in full;
//! a path is never simultaneously staged for addition and for removal.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, Snapshot};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The file name a snapshot key was created from (its final component),
/// which is what participates in blob hashing.
pub fn file_name_of(key: &str) -> String {
    Path::new(key)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| key.to_string())
}

/// True when the working-tree file differs from what the given commit
/// records for it: absent from the working tree, untracked by the commit,
/// or hashing to a different blob.
pub fn is_modified(key: &str, commit: Option<&Commit>) -> anyhow::Result<bool> {
    let path = Path::new(key);
    if !path.is_file() {
        return Ok(true);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read working file {key}"))?;
    let current = Blob::hash_for(&file_name_of(key), &content);

    Ok(commit.and_then(|c| c.blob_for(key)) != Some(&current))
}

/// Pending-change set between the working tree and the next commit.
#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
    added: BTreeMap<String, ObjectId>,
    removed: BTreeSet<String>,
    tracked: BTreeSet<String>,
}

impl Index {
    /// Read the index file; an absent file is an empty index.
    pub fn load(path: Box<Path>) -> anyhow::Result<Self> {
        let mut index = Index {
            path,
            added: BTreeMap::new(),
            removed: BTreeSet::new(),
            tracked: BTreeSet::new(),
        };

        if !index.path.exists() {
            return Ok(index);
        }

        let content = std::fs::read_to_string(&index.path)
            .with_context(|| format!("Unable to read index at {}", index.path.display()))?;
        for line in content.lines() {
            if let Some(entry) = line.strip_prefix("add ") {
                let (blob_id, key) = entry
                    .split_once(' ')
                    .context("Invalid index entry: missing path")?;
                index
                    .added
                    .insert(key.to_string(), ObjectId::try_parse(blob_id.to_string())?);
            } else if let Some(key) = line.strip_prefix("rm ") {
                index.removed.insert(key.to_string());
            } else if let Some(key) = line.strip_prefix("track ") {
                index.tracked.insert(key.to_string());
            } else if !line.is_empty() {
                anyhow::bail!("Invalid index entry: {line:?}");
            }
        }

        Ok(index)
    }

    /// Rewrite the whole index file.
    pub fn save(&self) -> anyhow::Result<()> {
        let mut lines = Vec::new();
        for (key, blob_id) in &self.added {
            lines.push(format!("add {} {}", blob_id.as_ref(), key));
        }
        for key in &self.removed {
            lines.push(format!("rm {key}"));
        }
        for key in &self.tracked {
            lines.push(format!("track {key}"));
        }
        let mut content = lines.join("\n");
        content.push('\n');

        std::fs::write(&self.path, content)
            .with_context(|| format!("Unable to write index at {}", self.path.display()))
    }

    pub fn added(&self) -> &BTreeMap<String, ObjectId> {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn is_staged(&self, key: &str) -> bool {
        self.added.contains_key(key)
    }

    pub fn is_removed(&self, key: &str) -> bool {
        self.removed.contains(key)
    }

    /// Tracked means recorded in the given commit's snapshot or staged
    /// since it.
    pub fn is_tracked(&self, key: &str, commit: Option<&Commit>) -> bool {
        commit.and_then(|c| c.blob_for(key)).is_some() || self.tracked.contains(key)
    }

    /// Nothing staged for addition or removal.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Stage a file for addition. Undoes a pending removal. Only writes a
    /// new blob when the content actually differs from what `head` records;
    /// re-adding an unchanged file instead drops any stale staged entry.
    pub fn stage_add(
        &mut self,
        key: &str,
        database: &Database,
        head: Option<&Commit>,
    ) -> anyhow::Result<()> {
        self.removed.remove(key);

        if is_modified(key, head)? {
            let content = std::fs::read_to_string(key)
                .with_context(|| format!("Unable to read working file {key}"))?;
            let blob = Blob::from_working_file(&file_name_of(key), content);
            database.store(&blob)?;

            self.added.insert(key.to_string(), blob.id().clone());
            self.tracked.insert(key.to_string());
        } else {
            self.added.remove(key);
        }

        self.save()
    }

    /// Stage a file for removal. A freshly staged file is simply unstaged;
    /// a tracked file is marked removed and deleted from the working tree.
    /// Returns false when the path is neither staged nor tracked.
    pub fn stage_remove(
        &mut self,
        key: &str,
        workspace: &Workspace,
        head: Option<&Commit>,
    ) -> anyhow::Result<bool> {
        if self.added.remove(key).is_some() {
            self.save()?;
            return Ok(true);
        }

        if self.is_tracked(key, head) {
            self.removed.insert(key.to_string());
            workspace.remove_key(key)?;
            self.save()?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Fold the pending changes into a snapshot: additions override entries,
    /// removals delete entries and their working-tree files. Returns whether
    /// the snapshot changed at all.
    pub fn commit_changes(
        &self,
        snapshot: &mut Snapshot,
        workspace: &Workspace,
    ) -> anyhow::Result<bool> {
        let mut changed = false;

        if !self.added.is_empty() {
            changed = true;
            snapshot.extend(
                self.added
                    .iter()
                    .map(|(key, blob_id)| (key.clone(), blob_id.clone())),
            );
        }

        if !self.removed.is_empty() {
            changed = true;
            for key in &self.removed {
                snapshot.remove(key);
                workspace.remove_key(key)?;
            }
        }

        Ok(changed)
    }

    /// Drop every pending change and persist the empty index.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.added.clear();
        self.removed.clear();
        self.tracked.clear();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        _dir: assert_fs::TempDir,
        index: Index,
        database: Database,
        workspace: Workspace,
    }

    fn fixture() -> Fixture {
        let dir = assert_fs::TempDir::new().expect("temp dir");
        let root = dir.path().canonicalize().expect("canonical root");
        let index = Index::load(root.join("index").into_boxed_path()).expect("empty index");
        let database = Database::new(root.join("objects").into_boxed_path());
        let workspace = Workspace::new(root.clone().into_boxed_path());

        Fixture {
            _dir: dir,
            index,
            database,
            workspace,
        }
    }

    #[test]
    fn test_staging_a_new_file_records_its_blob() -> anyhow::Result<()> {
        let mut fx = fixture();
        let key = fx.workspace.file_key("a.txt");
        std::fs::write(&key, "fresh\n")?;

        fx.index.stage_add(&key, &fx.database, None)?;

        let staged = fx.index.added().get(&key).expect("staged entry");
        assert_eq!(staged, &Blob::hash_for("a.txt", "fresh\n"));
        assert!(fx.database.contains(staged));
        Ok(())
    }

    #[test]
    fn test_staging_undoes_a_pending_removal() -> anyhow::Result<()> {
        let mut fx = fixture();
        let key = fx.workspace.file_key("a.txt");
        std::fs::write(&key, "back again\n")?;
        fx.index.removed.insert(key.clone());

        fx.index.stage_add(&key, &fx.database, None)?;

        assert!(!fx.index.is_removed(&key));
        assert!(fx.index.is_staged(&key));
        Ok(())
    }

    #[test]
    fn test_unstaging_a_fresh_addition_leaves_the_file_alone() -> anyhow::Result<()> {
        let mut fx = fixture();
        let key = fx.workspace.file_key("a.txt");
        std::fs::write(&key, "staged then dropped\n")?;
        fx.index.stage_add(&key, &fx.database, None)?;

        let handled = fx.index.stage_remove(&key, &fx.workspace, None)?;

        assert!(handled);
        assert!(fx.index.is_clean());
        assert!(Path::new(&key).is_file());
        Ok(())
    }

    #[test]
    fn test_removing_an_unknown_path_is_refused() -> anyhow::Result<()> {
        let mut fx = fixture();
        let key = fx.workspace.file_key("stranger.txt");

        let handled = fx.index.stage_remove(&key, &fx.workspace, None)?;

        assert!(!handled);
        Ok(())
    }

    #[test]
    fn test_commit_changes_reports_an_empty_diff() -> anyhow::Result<()> {
        let fx = fixture();
        let mut snapshot = Snapshot::new();

        let changed = fx.index.commit_changes(&mut snapshot, &fx.workspace)?;

        assert!(!changed);
        assert!(snapshot.is_empty());
        Ok(())
    }

    #[test]
    fn test_commit_changes_folds_additions_and_removals() -> anyhow::Result<()> {
        let mut fx = fixture();
        let kept = fx.workspace.file_key("kept.txt");
        let doomed = fx.workspace.file_key("doomed.txt");
        std::fs::write(&kept, "kept\n")?;
        std::fs::write(&doomed, "doomed\n")?;

        let mut snapshot = Snapshot::new();
        snapshot.insert(doomed.clone(), Blob::hash_for("doomed.txt", "doomed\n"));

        fx.index.stage_add(&kept, &fx.database, None)?;
        fx.index.removed.insert(doomed.clone());

        let changed = fx.index.commit_changes(&mut snapshot, &fx.workspace)?;

        assert!(changed);
        assert!(snapshot.contains_key(&kept));
        assert!(!snapshot.contains_key(&doomed));
        assert!(!Path::new(&doomed).is_file());
        Ok(())
    }

    #[test]
    fn test_index_round_trips_through_its_file() -> anyhow::Result<()> {
        let mut fx = fixture();
        let key = fx.workspace.file_key("a.txt");
        std::fs::write(&key, "persisted\n")?;
        fx.index.stage_add(&key, &fx.database, None)?;
        fx.index.removed.insert(fx.workspace.file_key("b.txt"));
        fx.index.save()?;

        let reloaded = Index::load(fx.index.path.clone())?;

        assert_eq!(reloaded.added(), fx.index.added());
        assert_eq!(reloaded.removed(), fx.index.removed());
        assert_eq!(reloaded.tracked, fx.index.tracked);
        Ok(())
    }
}
