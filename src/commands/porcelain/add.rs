use crate::areas::repository::Repository;
use crate::errors::Abort;

impl Repository {
    pub fn add(&self, name: &str) -> anyhow::Result<()> {
        if !self.workspace().exists(name) {
            anyhow::bail!(Abort::FileMissing);
        }

        let head = self.head_commit()?;
        let mut index = self.index()?;

        index.stage_add(
            &self.workspace().file_key(name),
            self.database(),
            head.as_ref(),
        )
    }
}
