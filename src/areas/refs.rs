//! Branch references and HEAD.
//!
//! Branches live as one file each under `refs/heads/`, named after the
//! branch with `/` substituted by `_`. HEAD is not a symbolic pointer but a
//! full copy of the current branch, rewritten on every head move so the two
//! stay in sync. `refs/commits` is an append-only concatenation of every
//! 40-character commit id created in this repository, backing the global
//! log and message search.

use crate::artifacts::branch::Branch;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reference manager rooted at a repository's state directory.
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    fn commit_log_path(&self) -> PathBuf {
        self.refs_path().join("commits")
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_path().join(Branch::disk_name_of(name))
    }

    /// The current branch, by value.
    pub fn read_head(&self) -> anyhow::Result<Branch> {
        let content = std::fs::read_to_string(self.head_path())
            .with_context(|| format!("Unable to read HEAD at {}", self.head_path().display()))?;

        Branch::deserialize(&content)
    }

    /// Rewrite HEAD with a full copy of the given branch.
    pub fn write_head(&self, branch: &Branch) -> anyhow::Result<()> {
        std::fs::write(self.head_path(), branch.serialize())
            .with_context(|| format!("Unable to write HEAD at {}", self.head_path().display()))
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).exists()
    }

    pub fn read_branch(&self, name: &str) -> anyhow::Result<Option<Branch>> {
        let path = self.branch_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read branch at {}", path.display()))?;

        Ok(Some(Branch::deserialize(&content)?))
    }

    pub fn write_branch(&self, branch: &Branch) -> anyhow::Result<()> {
        let path = self.heads_path().join(branch.disk_name());
        std::fs::write(&path, branch.serialize())
            .with_context(|| format!("Unable to write branch at {}", path.display()))
    }

    /// Delete a branch file. Returns false when no such branch exists.
    pub fn delete_branch(&self, name: &str) -> anyhow::Result<bool> {
        let path = self.branch_path(name);
        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(&path)
            .with_context(|| format!("Unable to delete branch at {}", path.display()))?;

        Ok(true)
    }

    /// Sorted on-disk branch names.
    pub fn list_branch_names(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in std::fs::read_dir(self.heads_path()).with_context(|| {
            format!("Unable to list branches at {}", self.heads_path().display())
        })? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Move a branch (and HEAD with it) to a new tip.
    pub fn advance(&self, branch: &mut Branch, tip: &ObjectId) -> anyhow::Result<()> {
        branch.set_head(tip.clone());
        self.write_head(branch)?;
        self.write_branch(branch)
    }

    /// Append a newly created commit id to the commit log.
    pub fn record_commit(&self, id: &ObjectId) -> anyhow::Result<()> {
        let mut log = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.commit_log_path())
            .with_context(|| {
                format!(
                    "Unable to open commit log at {}",
                    self.commit_log_path().display()
                )
            })?;

        log.write_all(id.as_ref().as_bytes())
            .context("Unable to append to commit log")
    }

    /// Every commit id ever recorded, in creation order.
    pub fn all_commit_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let path = self.commit_log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read commit log at {}", path.display()))?;
        let content = content.trim();

        let mut ids = Vec::new();
        let mut rest = content;
        while !rest.is_empty() {
            if rest.len() < OBJECT_ID_LENGTH {
                anyhow::bail!("Corrupt commit log: trailing {} characters", rest.len());
            }
            let (id, remainder) = rest.split_at(OBJECT_ID_LENGTH);
            ids.push(ObjectId::try_parse(id.to_string())?);
            rest = remainder;
        }

        Ok(ids)
    }
}
