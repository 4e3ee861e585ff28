//! Blob object
//!
//! A blob is the immutable snapshot of one file's content. Its id hashes the
//! content together with the file's name, so the same bytes under two names
//! are two distinct blobs.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Immutable content snapshot of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: String,
    id: ObjectId,
}

impl Blob {
    /// Snapshot the given content under the given file name.
    pub fn from_working_file(file_name: &str, content: String) -> Self {
        let id = Self::hash_for(file_name, &content);
        Blob { content, id }
    }

    /// The id a blob with this name and content would have, without
    /// constructing or storing it.
    pub fn hash_for(file_name: &str, content: &str) -> ObjectId {
        ObjectId::digest(&[content.as_bytes(), file_name.as_bytes()])
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.content.as_bytes();

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(id: ObjectId, reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader.bytes().collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        Ok(Blob { content, id })
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
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

    #[test]
    fn test_same_content_and_name_hash_identically() {
        let first = Blob::from_working_file("notes.txt", "hello\n".to_string());
        let second = Blob::from_working_file("notes.txt", "hello\n".to_string());
        assert_eq!(first.id(), second.id());
    }

    #[test]
    fn test_file_name_participates_in_the_id() {
        let first = Blob::from_working_file("a.txt", "hello\n".to_string());
        let second = Blob::from_working_file("b.txt", "hello\n".to_string());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_serialized_blob_round_trips() -> anyhow::Result<()> {
        let blob = Blob::from_working_file("a.txt", "some content\n".to_string());
        let bytes = blob.serialize()?;

        let mut reader = Cursor::new(bytes);
        let object_type = ObjectType::parse_object_type(&mut reader)?;
        assert_eq!(object_type, ObjectType::Blob);

        let restored = Blob::deserialize(blob.id().clone(), reader)?;
        assert_eq!(restored, blob);

        Ok(())
    }
}
