use crate::areas::database::{Database, Lookup};
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::remotes::Remotes;
use crate::areas::workspace::Workspace;
use crate::artifacts::merge::split_finder::{SlimCommit, SplitFinder};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Abort;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Name of the state directory holding all durable repository data.
pub const STATE_DIR: &str = ".bitlet";

/// Explicit handle over one repository: the working tree plus the areas
/// rooted in its state directory. Every operation goes through a handle;
/// there is no ambient global state.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Bind a repository handle at the given working-tree root. The state
    /// directory may or may not exist yet; `init` creates it, `open`
    /// requires it.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let state_path = path.join(STATE_DIR);

        let database = Database::new(state_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(state_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
            refs,
        })
    }

    /// Bind a handle over an existing repository.
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Self::new(path, writer)?;
        if !repository.state_path().exists() {
            anyhow::bail!(Abort::RepositoryMissing);
        }

        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_path(&self) -> PathBuf {
        self.path.join(STATE_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Load the staging area from disk.
    pub fn index(&self) -> anyhow::Result<Index> {
        Index::load(self.state_path().join("index").into_boxed_path())
    }

    /// Load the remote registry from disk.
    pub fn remotes(&self) -> anyhow::Result<Remotes> {
        Remotes::load(self.refs.refs_path().join("remotes").into_boxed_path())
    }

    /// The commit the current branch points at, if any.
    pub fn head_commit(&self) -> anyhow::Result<Option<Commit>> {
        match self.refs.read_head()?.head() {
            Some(tip) => self.database.load_commit(tip),
            None => Ok(None),
        }
    }

    /// A split finder walking this repository's object store.
    pub fn split_finder(
        &self,
    ) -> SplitFinder<impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_> {
        SplitFinder::new(move |oid: &ObjectId| self.database.slim_commit(oid))
    }

    /// Resolve a full or abbreviated commit id to a commit, aborting with
    /// the fixed message when it does not name exactly one commit.
    pub fn resolve_commit(&self, hint: &str) -> anyhow::Result<Commit> {
        match self.database.resolve(hint)? {
            Lookup::Found(id) => self
                .database
                .load_commit(&id)?
                .ok_or_else(|| Abort::NoSuchCommit.into()),
            Lookup::Ambiguous | Lookup::NotFound => Err(Abort::NoSuchCommit.into()),
        }
    }
}
