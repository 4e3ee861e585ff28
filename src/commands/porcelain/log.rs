use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::errors::Abort;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// History of the current branch, newest first, following first
    /// parents only (merge side branches are not expanded).
    pub fn log(&self) -> anyhow::Result<()> {
        let mut commit = self.head_commit()?;

        while let Some(current) = commit {
            self.print_log_entry(&current)?;

            commit = match current.parent() {
                Some(parent) => self.database().load_commit(parent)?,
                None => None,
            };
        }

        Ok(())
    }

    /// Every commit ever created in this repository, in creation order.
    pub fn global_log(&self) -> anyhow::Result<()> {
        for id in self.refs().all_commit_ids()? {
            let commit = self
                .database()
                .load_commit(&id)?
                .with_context(|| format!("commit {id} in the log but not in the object store"))?;
            self.print_log_entry(&commit)?;
        }

        Ok(())
    }

    /// Ids of every commit whose message matches exactly, one per line.
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let mut matches = Vec::new();

        for id in self.refs().all_commit_ids()? {
            let commit = self
                .database()
                .load_commit(&id)?
                .with_context(|| format!("commit {id} in the log but not in the object store"))?;
            if commit.message() == message {
                matches.push(id);
            }
        }

        if matches.is_empty() {
            anyhow::bail!(Abort::NoSuchMessage);
        }

        let mut writer = self.writer();
        for id in matches {
            writeln!(writer, "{id}")?;
        }

        Ok(())
    }

    fn print_log_entry(&self, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "commit {}", commit.id())?;
        writeln!(writer, "Date: {}", commit.readable_date())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
