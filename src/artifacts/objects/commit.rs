//! Commit object
//!
//! A commit is one immutable node of the history DAG: a message, a unix
//! timestamp, up to two parent references (the second one only on merge
//! commits) and a snapshot mapping every tracked file path to a blob id.
//!
//! The commit id hashes the first parent, the timestamp and the message —
//! deliberately not the snapshot, and not the second parent. Two commits
//! created in the same second with the same parent and message therefore
//! collide; the store's idempotent write makes that harmless on disk. The
//! root commit is pinned to timestamp 0 so its id is identical in every
//! repository.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! date <unix-seconds>
//! parent <parent-sha>
//! merge <second-parent-sha>
//! entry <blob-sha> <file path>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Mapping from absolute working-tree file path to blob id.
pub type Snapshot = BTreeMap<String, ObjectId>;

/// Immutable node in the history DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    message: String,
    parent: Option<ObjectId>,
    second_parent: Option<ObjectId>,
    timestamp: i64,
    snapshot: Snapshot,
    id: ObjectId,
}

impl Commit {
    /// Create a commit over a finalized snapshot.
    ///
    /// A commit without a parent is the root commit and gets the fixed
    /// epoch timestamp; everything else is stamped with the current time.
    pub fn new(
        message: impl Into<String>,
        parent: Option<ObjectId>,
        second_parent: Option<ObjectId>,
        snapshot: Snapshot,
    ) -> Self {
        let message = message.into();
        let timestamp = match parent {
            Some(_) => chrono::Utc::now().timestamp(),
            None => 0,
        };
        let id = Self::derive_id(parent.as_ref(), timestamp, &message);

        Commit {
            message,
            parent,
            second_parent,
            timestamp,
            snapshot,
            id,
        }
    }

    fn derive_id(parent: Option<&ObjectId>, timestamp: i64, message: &str) -> ObjectId {
        let parent_part = parent.map(|p| p.as_ref()).unwrap_or("none");

        ObjectId::digest(&[
            parent_part.as_bytes(),
            timestamp.to_string().as_bytes(),
            message.as_bytes(),
        ])
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.second_parent.as_ref()
    }

    /// First and second parent, in that order, skipping absent ones.
    pub fn parents(&self) -> Vec<ObjectId> {
        self.parent
            .iter()
            .chain(self.second_parent.iter())
            .cloned()
            .collect()
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The blob recorded for the given file path, if the path is tracked.
    pub fn blob_for(&self, path: &str) -> Option<&ObjectId> {
        self.snapshot.get(path)
    }

    /// Timestamp rendered for the log, in the local timezone.
    pub fn readable_date(&self) -> String {
        chrono::DateTime::from_timestamp(self.timestamp, 0)
            .map(|utc| {
                utc.with_timezone(&chrono::Local)
                    .format("%a %b %d %H:%M:%S %Y %z")
                    .to_string()
            })
            .unwrap_or_default()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        object_content.push(format!("date {}", self.timestamp));
        if let Some(parent) = &self.parent {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        if let Some(second_parent) = &self.second_parent {
            object_content.push(format!("merge {}", second_parent.as_ref()));
        }
        for (path, blob_id) in &self.snapshot {
            object_content.push(format!("entry {} {}", blob_id.as_ref(), path));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");
        let content_bytes = object_content.as_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(id: ObjectId, reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let date_line = lines
            .next()
            .context("Invalid commit object: missing date line")?;
        let timestamp = date_line
            .strip_prefix("date ")
            .context("Invalid commit object: invalid date line")?
            .parse::<i64>()
            .context("Invalid commit object: invalid timestamp")?;

        let mut parent = None;
        let mut second_parent = None;
        let mut snapshot = Snapshot::new();

        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            if let Some(parent_id) = line.strip_prefix("parent ") {
                parent = Some(ObjectId::try_parse(parent_id.to_string())?);
            } else if let Some(second_parent_id) = line.strip_prefix("merge ") {
                second_parent = Some(ObjectId::try_parse(second_parent_id.to_string())?);
            } else if let Some(entry) = line.strip_prefix("entry ") {
                if entry.len() <= OBJECT_ID_LENGTH {
                    anyhow::bail!("Invalid commit object: malformed snapshot entry");
                }
                let (blob_id, path) = entry.split_at(OBJECT_ID_LENGTH);
                let blob_id = ObjectId::try_parse(blob_id.to_string())?;
                snapshot.insert(path[1..].to_string(), blob_id);
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Commit {
            message,
            parent,
            second_parent,
            timestamp,
            snapshot,
            id,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn id(&self) -> &ObjectId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn snapshot_of(entries: &[(&str, &str)]) -> Snapshot {
        entries
            .iter()
            .map(|(path, seed)| (path.to_string(), ObjectId::digest(&[seed.as_bytes()])))
            .collect()
    }

    #[test]
    fn test_root_commit_has_a_stable_id() {
        let first = Commit::new("initial commit", None, None, Snapshot::new());
        let second = Commit::new("initial commit", None, None, Snapshot::new());

        assert_eq!(first.timestamp(), 0);
        assert_eq!(first.id(), second.id());
    }

    #[test]
    fn test_commit_id_ignores_the_snapshot() {
        let parent = ObjectId::digest(&[b"parent"]);
        let with_files = Commit::new(
            "same message",
            Some(parent.clone()),
            None,
            snapshot_of(&[("/repo/a.txt", "a")]),
        );
        let without_files = Commit::new("same message", Some(parent), None, Snapshot::new());

        // identical parent, message and (same-second) timestamp collide on
        // purpose; the snapshot is not part of the id
        if with_files.timestamp() == without_files.timestamp() {
            assert_eq!(with_files.id(), without_files.id());
        }
    }

    #[test]
    fn test_serialized_commit_round_trips() -> anyhow::Result<()> {
        let parent = ObjectId::digest(&[b"parent"]);
        let second = ObjectId::digest(&[b"second"]);
        let commit = Commit::new(
            "Merged feature into master.",
            Some(parent),
            Some(second),
            snapshot_of(&[("/repo/a.txt", "a"), ("/repo/dir file.txt", "b")]),
        );

        let bytes = commit.serialize()?;
        let mut reader = Cursor::new(bytes);
        let object_type = ObjectType::parse_object_type(&mut reader)?;
        assert_eq!(object_type, ObjectType::Commit);

        let restored = Commit::deserialize(commit.id().clone(), reader)?;
        assert_eq!(restored, commit);

        Ok(())
    }

    #[test]
    fn test_multiline_message_round_trips() -> anyhow::Result<()> {
        let parent = ObjectId::digest(&[b"parent"]);
        let commit = Commit::new(
            "subject line\n\nbody with details",
            Some(parent),
            None,
            Snapshot::new(),
        );

        let bytes = commit.serialize()?;
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_object_type(&mut reader)?;
        let restored = Commit::deserialize(commit.id().clone(), reader)?;

        assert_eq!(restored.message(), "subject line\n\nbody with details");

        Ok(())
    }

    #[test]
    fn test_parents_lists_first_then_second() {
        let parent = ObjectId::digest(&[b"parent"]);
        let second = ObjectId::digest(&[b"second"]);
        let commit = Commit::new(
            "merge",
            Some(parent.clone()),
            Some(second.clone()),
            Snapshot::new(),
        );

        assert_eq!(commit.parents(), vec![parent, second]);
    }
}
