//! Split point search for merges.
//!
//! Merging needs a base commit to compare both branch tips against. The
//! search runs in two walks over the history DAG:
//!
//! 1. Collect every ancestor of the current tip (inclusive of the tip
//!    itself), following both parent links.
//! 2. Walk the given tip the same way; every first-encountered commit that
//!    is already in the current side's set is a *candidate* and the walk
//!    does not descend past it. Parallel merge history can surface several
//!    candidates, so the one with the latest timestamp wins.
//!
//! The latest-timestamp tie-break is a heuristic approximation of the lowest
//! common ancestor, not a guarantee; histories with multiple divergent
//! common ancestors can pick a base a true-LCA search would not. Callers
//! rely on this exact behavior, so it stays.
//!
//! Both walks are explicit-stack depth-first traversals (first parent
//! pushed last, so the first-parent chain is explored first), keeping the
//! recursion depth independent of history length and the visit order
//! deterministic.
//!
//! ## Debug Logging
//!
//! Build with the `debug_merge` feature to trace candidate discovery:
//! ```toml
//! # In Cargo.toml
//! [features]
//! debug_merge = []
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashSet;

/// Macro for debug logging that is enabled with the debug_merge feature flag
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

/// Parent links and timestamp of one commit, enough for history traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// First and (for merge commits) second parent, in that order
    pub parents: Vec<ObjectId>,
    /// Commit timestamp in unix seconds
    pub timestamp: i64,
}

/// Ancestor ids of one commit, inclusive of the commit itself, in
/// deterministic first-parent preorder.
#[derive(Debug, Default)]
pub struct AncestorSet {
    order: Vec<ObjectId>,
    members: HashSet<ObjectId>,
}

impl AncestorSet {
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.members.contains(id)
    }

    /// Ids in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Finds ancestor sets and merge split points over any commit source.
///
/// The finder is generic over a loader function so the same algorithm runs
/// against the on-disk object database and against in-memory graphs in
/// tests.
pub struct SplitFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> SplitFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Every commit reachable from `tip` by following parent links,
    /// including `tip` itself.
    pub fn ancestors(&self, tip: &ObjectId) -> anyhow::Result<AncestorSet> {
        let mut set = AncestorSet::default();
        let mut stack = vec![tip.clone()];

        while let Some(oid) = stack.pop() {
            if !set.members.insert(oid.clone()) {
                continue;
            }
            set.order.push(oid.clone());

            let commit = (self.commit_loader)(&oid)?;
            // second parent goes under the first so the first-parent chain
            // is walked before merge side branches
            for parent in commit.parents.iter().rev() {
                stack.push(parent.clone());
            }
        }

        Ok(set)
    }

    /// The merge base of the two tips: the latest-timestamped commit where
    /// the walk from `given_tip` first meets the ancestor set of
    /// `current_tip`.
    ///
    /// Returning `current_tip` itself means the current branch can fast
    /// forward; returning `given_tip` means the given branch is already
    /// contained in the current one.
    pub fn split_point(
        &self,
        current_tip: &ObjectId,
        given_tip: &ObjectId,
    ) -> anyhow::Result<ObjectId> {
        let reachable = self.ancestors(current_tip)?;

        let mut visited = HashSet::new();
        let mut stack = vec![given_tip.clone()];
        let mut best: Option<(i64, ObjectId)> = None;

        while let Some(oid) = stack.pop() {
            if !visited.insert(oid.clone()) {
                continue;
            }

            if reachable.contains(&oid) {
                let candidate = (self.commit_loader)(&oid)?;
                debug_log!(
                    "split candidate {} at timestamp {}",
                    candidate.oid,
                    candidate.timestamp
                );

                // strictly greater keeps the first candidate on timestamp ties
                if best
                    .as_ref()
                    .is_none_or(|(timestamp, _)| candidate.timestamp > *timestamp)
                {
                    best = Some((candidate.timestamp, oid));
                }
                // a candidate's own ancestors cannot be better candidates
                continue;
            }

            let commit = (self.commit_loader)(&oid)?;
            for parent in commit.parents.iter().rev() {
                stack.push(parent.clone());
            }
        }

        let (_, split) = best.ok_or_else(|| anyhow::anyhow!("branches share no history"))?;
        debug_log!("split point {}", split);

        Ok(split)
    }
}
