use crate::artifacts::merge::split_finder::SlimCommit;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::{OBJECT_ID_LENGTH, SHORT_ID_LENGTH};
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Result of looking up a possibly abbreviated object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ObjectId),
    Ambiguous,
    NotFound,
}

/// The content-addressed object store: one zlib-compressed file per object
/// under `objects/<first 2 hex chars>/<remaining 38>`. Objects are immutable
/// and never collected; storing is idempotent and writes are whole-object
/// (temp file plus rename).
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<()> {
        let object_path = self.path.join(object.object_path());

        // write the object to disk unless it already exists
        if !object_path.exists() {
            let object_content = object.serialize()?;

            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object_content)?;
        }

        Ok(())
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object_as_bytes(object_id)? {
            Some((ObjectType::Blob, object_reader)) => {
                Ok(Some(Blob::deserialize(object_id.clone(), object_reader)?))
            }
            _ => Ok(None),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object_as_bytes(object_id)? {
            Some((ObjectType::Commit, object_reader)) => {
                Ok(Some(Commit::deserialize(object_id.clone(), object_reader)?))
            }
            _ => Ok(None),
        }
    }

    /// Parent links and timestamp of a commit, for history traversal.
    pub fn slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self
            .load_commit(object_id)?
            .with_context(|| format!("commit {object_id} not found in object store"))?;

        Ok(SlimCommit {
            oid: commit.id().clone(),
            parents: commit.parents(),
            timestamp: commit.timestamp(),
        })
    }

    /// Resolve a full 40-character id or an 8-character abbreviation
    /// against the on-disk sharding. Any other length resolves to nothing.
    pub fn resolve(&self, hint: &str) -> anyhow::Result<Lookup> {
        if !hint.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Lookup::NotFound);
        }

        if hint.len() == OBJECT_ID_LENGTH {
            let object_id = ObjectId::try_parse(hint.to_string())?;
            return Ok(if self.contains(&object_id) {
                Lookup::Found(object_id)
            } else {
                Lookup::NotFound
            });
        }

        if hint.len() != SHORT_ID_LENGTH {
            return Ok(Lookup::NotFound);
        }

        let (dir_name, file_prefix) = hint.split_at(2);
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(Lookup::NotFound);
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                matches.push(ObjectId::try_parse(format!("{dir_name}{file_name}"))?);
            }
        }

        match matches.len() {
            0 => Ok(Lookup::NotFound),
            1 => Ok(Lookup::Found(matches.remove(0))),
            _ => Ok(Lookup::Ambiguous),
        }
    }

    /// Copy one object's raw bytes into another store. Existing objects are
    /// never overwritten, so history can be transferred repeatedly without
    /// duplication.
    pub fn copy_raw_to(&self, target: &Database, object_id: &ObjectId) -> anyhow::Result<()> {
        if target.contains(object_id) {
            return Ok(());
        }

        let source_path = self.path.join(object_id.to_path());
        let target_path = target.path.join(object_id.to_path());

        std::fs::create_dir_all(
            target_path
                .parent()
                .context(format!("Invalid object path {}", target_path.display()))?,
        )?;
        let raw = std::fs::read(&source_path).context(format!(
            "Unable to read object file {}",
            source_path.display()
        ))?;

        std::fs::write(&target_path, raw).context(format!(
            "Unable to write object file {}",
            target_path.display()
        ))?;

        Ok(())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<Option<(ObjectType, impl BufRead)>> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.exists() {
            return Ok(None);
        }

        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok(Some((object_type, object_reader)))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
