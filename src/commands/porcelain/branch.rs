use crate::areas::repository::Repository;
use crate::artifacts::branch::Branch;
use crate::errors::Abort;

impl Repository {
    /// Create a branch pointing at the current commit. The new branch does
    /// not become current.
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        if self.refs().branch_exists(name) {
            anyhow::bail!(Abort::BranchExists);
        }

        let current = self.refs().read_head()?;
        self.refs()
            .write_branch(&Branch::new(name, current.head().cloned()))
    }

    /// Delete a branch pointer. History stays in the object store; only
    /// the pointer goes away. The current branch cannot be deleted.
    pub fn rm_branch(&self, name: &str) -> anyhow::Result<()> {
        let current = self.refs().read_head()?;
        if Branch::disk_name_of(name) == current.disk_name() {
            anyhow::bail!(Abort::RemoveCurrentBranch);
        }

        if !self.refs().delete_branch(name)? {
            anyhow::bail!(Abort::BranchMissing);
        }

        Ok(())
    }
}
