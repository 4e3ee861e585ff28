use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Abort;
use anyhow::Context;

impl Repository {
    /// `checkout -- <file>`: restore one file from the current commit.
    pub fn checkout_file_from_head(&self, name: &str) -> anyhow::Result<()> {
        let head = self
            .head_commit()?
            .context("no commits on the current branch")?;

        self.checkout_file(&head, &self.workspace().file_key(name))
    }

    /// `checkout <commit> -- <file>`: restore one file from any commit.
    pub fn checkout_file_from(&self, commit_hint: &str, name: &str) -> anyhow::Result<()> {
        let commit = self.resolve_commit(commit_hint)?;

        self.checkout_file(&commit, &self.workspace().file_key(name))
    }

    /// `checkout <branch>`: replace the whole working tree with the target
    /// branch's snapshot and make that branch current. Refuses to run over
    /// untracked files, since the wipe-and-restore would clobber them.
    pub fn checkout_branch(&self, name: &str) -> anyhow::Result<()> {
        let Some(target) = self.refs().read_branch(name)? else {
            anyhow::bail!(Abort::NoSuchBranch);
        };
        let current = self.refs().read_head()?;
        if target.disk_name() == current.disk_name() {
            anyhow::bail!(Abort::AlreadyCurrent);
        }
        self.ensure_no_untracked()?;

        let tip = target.head().context("branch has no commits")?;
        let commit = self
            .database()
            .load_commit(tip)?
            .with_context(|| format!("commit {tip} not found in object store"))?;

        self.replace_working_tree(&commit)?;
        self.refs().write_head(&target)
    }

    /// `reset <commit>`: same wipe-and-restore against an arbitrary commit,
    /// but the current branch keeps its name and only its head moves.
    pub fn reset(&self, commit_hint: &str) -> anyhow::Result<()> {
        let commit = self.resolve_commit(commit_hint)?;
        self.ensure_no_untracked()?;

        self.replace_working_tree(&commit)?;

        let mut branch = self.refs().read_head()?;
        self.refs().advance(&mut branch, commit.id())
    }

    pub(crate) fn checkout_file(&self, commit: &Commit, key: &str) -> anyhow::Result<()> {
        let Some(blob_id) = commit.blob_for(key) else {
            anyhow::bail!(Abort::NotInCommit);
        };

        self.restore_file(blob_id, key)
    }

    pub(crate) fn restore_file(&self, blob_id: &ObjectId, key: &str) -> anyhow::Result<()> {
        let blob = self
            .database()
            .load_blob(blob_id)?
            .with_context(|| format!("blob {blob_id} not found in object store"))?;

        self.workspace().write_key(key, blob.content())
    }

    fn replace_working_tree(&self, commit: &Commit) -> anyhow::Result<()> {
        self.workspace().clear()?;
        for (key, blob_id) in commit.snapshot() {
            self.restore_file(blob_id, key)?;
        }

        self.index()?.clear()
    }
}
