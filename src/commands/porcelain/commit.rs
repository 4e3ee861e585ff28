use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, Snapshot};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Abort;
use anyhow::Context;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.commit_with(message, None)?;
        Ok(())
    }

    /// Produce a commit from the staging area: the parent's snapshot plus
    /// the staged additions, minus the staged removals. The index is
    /// cleared and the current branch (and HEAD with it) advances to the
    /// new commit, whose id is also appended to the commit log.
    pub(crate) fn commit_with(
        &self,
        message: &str,
        second_parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let mut branch = self.refs().read_head()?;
        let parent = branch.head().cloned();

        let mut snapshot = match &parent {
            Some(tip) => self
                .database()
                .load_commit(tip)?
                .with_context(|| format!("commit {tip} not found in object store"))?
                .snapshot()
                .clone(),
            None => Snapshot::new(),
        };

        let mut index = self.index()?;
        let changed = index.commit_changes(&mut snapshot, self.workspace())?;
        if parent.is_some() && !changed {
            anyhow::bail!(Abort::NoChanges);
        }

        let commit = Commit::new(message, parent, second_parent, snapshot);
        self.database().store(&commit)?;

        index.clear()?;
        self.refs().advance(&mut branch, commit.id())?;
        self.refs().record_commit(commit.id())?;

        Ok(commit.id().clone())
    }
}
