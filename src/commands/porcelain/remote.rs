use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use crate::artifacts::branch::Branch;
use crate::artifacts::merge::split_finder::{AncestorSet, SplitFinder};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Abort;
use anyhow::Context;
use std::path::PathBuf;

impl Repository {
    /// Register another repository's state directory under a name.
    pub fn add_remote(&self, name: &str, path: &str) -> anyhow::Result<()> {
        let mut remotes = self.remotes()?;
        if !remotes.add(name, PathBuf::from(path)) {
            anyhow::bail!(Abort::RemoteExists);
        }

        remotes.save()
    }

    pub fn rm_remote(&self, name: &str) -> anyhow::Result<()> {
        let mut remotes = self.remotes()?;
        if !remotes.remove(name) {
            anyhow::bail!(Abort::RemoteMissing);
        }

        remotes.save()
    }

    /// Copy the remote branch's history into the local store and point the
    /// tracking branch `{remote}/{branch}` at its tip, creating the
    /// tracking branch on first fetch.
    pub fn fetch(&self, remote_name: &str, branch_name: &str) -> anyhow::Result<()> {
        let state = self.remote_state_path(remote_name)?;
        let remote_database = Database::new(state.join("objects").into_boxed_path());
        let remote_refs = Refs::new(state.into_boxed_path());

        let tip = remote_refs
            .read_branch(branch_name)?
            .and_then(|branch| branch.head().cloned());
        let Some(tip) = tip else {
            anyhow::bail!(Abort::NoSuchRemoteBranch);
        };

        let finder = SplitFinder::new(|oid: &ObjectId| remote_database.slim_commit(oid));
        let ancestors = finder.ancestors(&tip)?;
        copy_reachable(&remote_database, self.database(), &ancestors)?;

        let tracking_name = format!("{remote_name}/{branch_name}");
        let mut tracking = self
            .refs()
            .read_branch(&tracking_name)?
            .unwrap_or_else(|| Branch::new(tracking_name.clone(), None));
        tracking.set_head(tip);

        self.refs().write_branch(&tracking)
    }

    /// Copy the current branch's history into the remote store and advance
    /// the remote branch (and the remote HEAD) to the local tip. Refused
    /// unless the remote tip is already part of the local history, so
    /// pushing never rewrites the remote's past.
    pub fn push(&self, remote_name: &str, branch_name: &str) -> anyhow::Result<()> {
        let state = self.remote_state_path(remote_name)?;
        let remote_database = Database::new(state.join("objects").into_boxed_path());
        let remote_refs = Refs::new(state.into_boxed_path());

        let current = self.refs().read_head()?;
        let tip = current
            .head()
            .cloned()
            .context("current branch has no commits")?;

        let ancestors = self.split_finder().ancestors(&tip)?;

        let remote_branch = remote_refs.read_branch(branch_name)?;
        if let Some(remote_tip) = remote_branch.as_ref().and_then(|branch| branch.head())
            && !ancestors.contains(remote_tip)
        {
            anyhow::bail!(Abort::NotAncestor);
        }

        copy_reachable(self.database(), &remote_database, &ancestors)?;

        let mut remote_branch =
            remote_branch.unwrap_or_else(|| Branch::new(branch_name, None));
        remote_branch.set_head(tip);
        remote_refs.write_branch(&remote_branch)?;
        remote_refs.write_head(&remote_branch)
    }

    /// Fetch, then merge the freshened tracking branch into the current
    /// branch.
    pub fn pull(&self, remote_name: &str, branch_name: &str) -> anyhow::Result<()> {
        self.fetch(remote_name, branch_name)?;
        self.merge(&format!("{remote_name}/{branch_name}"))
    }

    fn remote_state_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        let remotes = self.remotes()?;

        remotes
            .get(name)
            .cloned()
            .filter(|path| path.exists())
            .ok_or_else(|| Abort::RemoteDirectoryMissing.into())
    }
}

/// Copy every commit in the set, and every blob those commits reference,
/// into the target store. Objects already present are skipped, never
/// rewritten, so repeated transfers cannot duplicate or corrupt history.
fn copy_reachable(
    source: &Database,
    target: &Database,
    ancestors: &AncestorSet,
) -> anyhow::Result<()> {
    for commit_id in ancestors.iter() {
        source.copy_raw_to(target, commit_id)?;

        let commit = target
            .load_commit(commit_id)?
            .with_context(|| format!("commit {commit_id} missing after transfer"))?;
        for blob_id in commit.snapshot().values() {
            source.copy_raw_to(target, blob_id)?;
        }
    }

    Ok(())
}
