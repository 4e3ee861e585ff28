use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;
use std::path::PathBuf;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    /// Rebuild the object from its body; the header has already been read
    /// and the id recovered from the storage path.
    fn deserialize(id: ObjectId, reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// A storable object. Unlike plain content-addressed stores, ids here are
/// domain-derived (blob: content and file name; commit: parent, timestamp
/// and message), so each object carries its own id instead of hashing its
/// serialized form.
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn id(&self) -> &ObjectId;

    fn object_path(&self) -> PathBuf {
        self.id().to_path()
    }
}
