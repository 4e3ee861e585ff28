use crate::areas::repository::Repository;
use crate::artifacts::branch::Branch;
use crate::errors::Abort;
use anyhow::Context;
use std::fs;

const DEFAULT_BRANCH: &str = "master";

impl Repository {
    /// Create the state directory, the default branch and the root commit.
    /// The root commit is parentless with the fixed epoch timestamp, so
    /// every repository starts from the same commit id.
    pub fn init(&self) -> anyhow::Result<()> {
        if self.state_path().exists() {
            anyhow::bail!(Abort::RepositoryExists);
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;
        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create refs/heads directory")?;

        let master = Branch::new(DEFAULT_BRANCH, None);
        self.refs().write_head(&master)?;
        self.refs().write_branch(&master)?;

        fs::write(self.state_path().join("index"), b"").context("Failed to create index file")?;
        fs::write(self.refs().refs_path().join("commits"), b"")
            .context("Failed to create commit log")?;
        fs::write(self.refs().refs_path().join("remotes"), b"")
            .context("Failed to create remote registry")?;

        self.commit_with("initial commit", None)?;

        Ok(())
    }
}
