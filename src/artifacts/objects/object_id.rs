//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings identifying blobs and
//! commits.
//!
//! ## Format
//!
//! - Full: 40 hex characters
//! - Short: first 8 characters, accepted wherever a commit id is looked up
//!
//! ## Storage
//!
//! Objects are stored in `objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_LENGTH, SHORT_ID_LENGTH};
use sha1::{Digest, Sha1};
use std::path::PathBuf;

/// A 40-character hexadecimal SHA-1 identifying one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id))
    }

    /// Hash the given byte slices, in order, into an object ID.
    pub fn digest(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }

        let oid = hasher.finalize();
        Self(format!("{oid:x}"))
    }

    /// Convert to the sharded file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Get the abbreviated form of the object ID
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(SHORT_ID_LENGTH).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn test_valid_hex_strings_of_full_length_parse(id in "[0-9a-f]{40}") {
            assert!(ObjectId::try_parse(id).is_ok());
        }

        #[test]
        fn test_wrong_length_is_rejected(id in "[0-9a-f]{0,39}") {
            assert!(ObjectId::try_parse(id).is_err());
        }

        #[test]
        fn test_non_hex_characters_are_rejected(
            prefix in "[0-9a-f]{10}",
            suffix in "[0-9a-f]{29}"
        ) {
            let id = format!("{}g{}", prefix, suffix);
            assert!(ObjectId::try_parse(id).is_err());
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        let first = ObjectId::digest(&[b"hello", b"world"]);
        let second = ObjectId::digest(&[b"hello", b"world"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_digest_depends_on_every_part() {
        let first = ObjectId::digest(&[b"hello", b"world"]);
        let second = ObjectId::digest(&[b"hello", b"other"]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_to_path_shards_on_first_two_chars() {
        let id = ObjectId::digest(&[b"content"]);
        let path = id.to_path();
        let text = id.to_string();
        assert_eq!(path, PathBuf::from(&text[..2]).join(&text[2..]));
    }
}
