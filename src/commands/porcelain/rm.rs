use crate::areas::repository::Repository;
use crate::errors::Abort;

impl Repository {
    pub fn rm(&self, name: &str) -> anyhow::Result<()> {
        let head = self.head_commit()?;
        let mut index = self.index()?;

        let handled = index.stage_remove(
            &self.workspace().file_key(name),
            self.workspace(),
            head.as_ref(),
        )?;
        if !handled {
            anyhow::bail!(Abort::NothingToRemove);
        }

        Ok(())
    }
}
