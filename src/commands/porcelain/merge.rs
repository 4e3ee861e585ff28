use crate::areas::repository::Repository;
use crate::artifacts::merge::{Resolution, classify, conflict_file_contents};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Abort;
use anyhow::Context;
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Merge the given branch into the current one.
    ///
    /// Conflicts are not fatal: each conflicted file is rewritten with
    /// markers, staged, reported, and the merge commit is still produced
    /// with both parents. The user resolves markers with ordinary edits and
    /// commits.
    pub fn merge(&self, branch_name: &str) -> anyhow::Result<()> {
        let current = self.refs().read_head()?;
        let Some(given) = self.refs().read_branch(branch_name)? else {
            anyhow::bail!(Abort::BranchMissing);
        };
        if given.disk_name() == current.disk_name() {
            anyhow::bail!(Abort::SelfMerge);
        }
        if !self.index()?.is_clean() {
            anyhow::bail!(Abort::UncommittedChanges);
        }
        self.ensure_no_untracked()?;

        let current_tip = current
            .head()
            .cloned()
            .context("current branch has no commits")?;
        let given_tip = given
            .head()
            .cloned()
            .context("given branch has no commits")?;

        let split = self.split_finder().split_point(&current_tip, &given_tip)?;
        if split == given_tip {
            anyhow::bail!(Abort::GivenIsAncestor);
        }
        if split == current_tip {
            self.checkout_branch(branch_name)?;
            anyhow::bail!(Abort::FastForwarded);
        }

        let split_commit = self
            .database()
            .load_commit(&split)?
            .with_context(|| format!("commit {split} not found in object store"))?;
        let current_commit = self
            .database()
            .load_commit(&current_tip)?
            .with_context(|| format!("commit {current_tip} not found in object store"))?;
        let given_commit = self
            .database()
            .load_commit(&given_tip)?
            .with_context(|| format!("commit {given_tip} not found in object store"))?;

        // every path either tip tracks, plus whatever sits in the working
        // tree right now
        let mut paths: BTreeSet<String> = current_commit.snapshot().keys().cloned().collect();
        paths.extend(given_commit.snapshot().keys().cloned());
        for name in self.workspace().list_file_names()? {
            paths.insert(self.workspace().file_key(&name));
        }

        let head = Some(&current_commit);
        let mut index = self.index()?;
        for key in &paths {
            let resolution = classify(
                split_commit.blob_for(key),
                current_commit.blob_for(key),
                given_commit.blob_for(key),
            );

            match resolution {
                Resolution::Keep => {}
                Resolution::TakeGiven => {
                    let blob_id = given_commit
                        .blob_for(key)
                        .context("given snapshot entry vanished during merge")?;
                    self.restore_file(blob_id, key)?;
                    index.stage_add(key, self.database(), head)?;
                }
                Resolution::Remove => {
                    index.stage_remove(key, self.workspace(), head)?;
                }
                Resolution::Conflict => {
                    let current_content = self.blob_content(current_commit.blob_for(key))?;
                    let given_content = self.blob_content(given_commit.blob_for(key))?;
                    let contents = conflict_file_contents(
                        current_content.as_deref(),
                        given_content.as_deref(),
                    );

                    self.workspace().write_key(key, &contents)?;
                    index.stage_add(key, self.database(), head)?;

                    writeln!(self.writer(), "Encountered a merge conflict.")?;
                }
            }
        }

        let message = format!("Merged {} into {}.", given.name(), current.name());
        self.commit_with(&message, Some(given_tip))?;

        Ok(())
    }

    fn blob_content(&self, blob_id: Option<&ObjectId>) -> anyhow::Result<Option<String>> {
        match blob_id {
            Some(id) => {
                let blob = self
                    .database()
                    .load_blob(id)?
                    .with_context(|| format!("blob {id} not found in object store"))?;
                Ok(Some(blob.content().to_string()))
            }
            None => Ok(None),
        }
    }
}
