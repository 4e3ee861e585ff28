//! Terminal command outcomes with fixed one-line messages.
//!
//! Every precondition failure in the porcelain commands maps to exactly one
//! of these variants. The message is printed verbatim on stdout and the
//! process exits cleanly (code 0); persisted state is never touched after a
//! precondition fails. Unexpected I/O errors are not part of this taxonomy
//! and keep their `anyhow` context.

use thiserror::Error;

/// A fixed-message abort of the current command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Abort {
    #[error("Please enter a command.")]
    NoCommand,
    #[error("No command with that name exists.")]
    UnknownCommand,
    #[error("Incorrect operands.")]
    BadOperands,
    #[error("Not in an initialized Bitlet directory.")]
    RepositoryMissing,
    #[error("A Bitlet version-control system already exists in the current directory.")]
    RepositoryExists,
    #[error("File does not exist.")]
    FileMissing,
    #[error("No reason to remove the file.")]
    NothingToRemove,
    #[error("Please enter a commit message.")]
    EmptyMessage,
    #[error("No changes added to the commit.")]
    NoChanges,
    #[error("File does not exist in that commit.")]
    NotInCommit,
    #[error("No commit with that id exists.")]
    NoSuchCommit,
    #[error("No such branch exists.")]
    NoSuchBranch,
    #[error("No need to checkout the current branch.")]
    AlreadyCurrent,
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedInTheWay,
    #[error("Found no commit with that message.")]
    NoSuchMessage,
    #[error("A branch with that name already exists.")]
    BranchExists,
    #[error("A branch with that name does not exist.")]
    BranchMissing,
    #[error("Cannot remove the current branch.")]
    RemoveCurrentBranch,
    #[error("Cannot merge a branch with itself.")]
    SelfMerge,
    #[error("You have uncommitted changes.")]
    UncommittedChanges,
    #[error("Given branch is an ancestor of the current branch.")]
    GivenIsAncestor,
    #[error("Current branch fast-forwarded.")]
    FastForwarded,
    #[error("A remote with that name already exists.")]
    RemoteExists,
    #[error("A remote with that name does not exist.")]
    RemoteMissing,
    #[error("Remote directory not found.")]
    RemoteDirectoryMissing,
    #[error("That remote does not have that branch.")]
    NoSuchRemoteBranch,
    #[error("Please pull down remote changes before pushing.")]
    NotAncestor,
}
