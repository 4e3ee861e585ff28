//! Branch pointers
//!
//! A branch is a mutable named pointer into the commit DAG. Remote-tracking
//! branches carry a `/` in their name (`origin/master`); on disk the `/` is
//! substituted with `_` for the file name while the true name is kept inside
//! the file, so the substitution loses nothing.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

/// Named pointer to a commit. The head is empty only for the short window
/// between repository initialization and the root commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    name: String,
    head: Option<ObjectId>,
}

impl Branch {
    pub fn new(name: impl Into<String>, head: Option<ObjectId>) -> Self {
        Branch {
            name: name.into(),
            head,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn head(&self) -> Option<&ObjectId> {
        self.head.as_ref()
    }

    pub fn set_head(&mut self, id: ObjectId) {
        self.head = Some(id);
    }

    /// File name this branch is stored under.
    pub fn disk_name(&self) -> String {
        Self::disk_name_of(&self.name)
    }

    /// File name any branch with the given name is stored under.
    pub fn disk_name_of(name: &str) -> String {
        name.replace('/', "_")
    }

    pub fn serialize(&self) -> String {
        let head = self
            .head
            .as_ref()
            .map(|id| id.as_ref().to_string())
            .unwrap_or_default();

        format!("name {}\nhead {}\n", self.name, head)
    }

    pub fn deserialize(text: &str) -> anyhow::Result<Self> {
        let mut lines = text.lines();

        let name = lines
            .next()
            .and_then(|line| line.strip_prefix("name "))
            .context("Invalid branch file: missing name line")?
            .to_string();

        let head_line = lines
            .next()
            .and_then(|line| line.strip_prefix("head"))
            .context("Invalid branch file: missing head line")?
            .trim();
        let head = if head_line.is_empty() {
            None
        } else {
            Some(ObjectId::try_parse(head_line.to_string())?)
        };

        Ok(Branch { name, head })
    }
}
