//! Three-way merge reconciliation.
//!
//! After the split point is known, every file is classified independently
//! from the three snapshot entries it has at the split, at the current tip
//! and at the given tip. The classification is a pure decision; applying it
//! (writing files, staging changes) is left to the caller.

pub mod split_finder;

use crate::artifacts::objects::object_id::ObjectId;

/// How one path is reconciled between two branch tips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The working tree already holds the right state; do nothing.
    Keep,
    /// Check the file out from the given branch and stage it.
    TakeGiven,
    /// Stage the path for removal.
    Remove,
    /// Both sides changed the path, and differently from each other.
    Conflict,
}

/// Classify one path from its blob ids at the split point and the two tips.
/// The first matching rule wins:
///
/// 1. created only by the current branch → keep
/// 2. created only by the given branch → take given
/// 3. untouched by the current branch, deleted by the given → remove
/// 4. untouched by the given branch, deleted by the current → keep absent
/// 5. untouched by the current branch, changed by the given → take given
/// 6. changed only by the current branch → keep
/// 7. changed identically on both sides (or deleted on both) → keep
///
/// Anything else means the two sides disagree: a conflict.
pub fn classify(
    split: Option<&ObjectId>,
    current: Option<&ObjectId>,
    given: Option<&ObjectId>,
) -> Resolution {
    let current_unchanged = current == split;
    let given_unchanged = given == split;

    if split.is_none() && current.is_some() && given.is_none() {
        Resolution::Keep
    } else if split.is_none() && current.is_none() && given.is_some() {
        Resolution::TakeGiven
    } else if current_unchanged && given_unchanged {
        Resolution::Keep
    } else if current_unchanged {
        match given {
            None => Resolution::Remove,
            Some(_) => Resolution::TakeGiven,
        }
    } else if given_unchanged || current == given {
        Resolution::Keep
    } else {
        Resolution::Conflict
    }
}

/// The working-tree content of a conflicted file. Sides deleted in one
/// branch contribute empty content; the pieces are concatenated directly,
/// so content without a trailing newline runs into the next marker.
pub fn conflict_file_contents(current: Option<&str>, given: Option<&str>) -> String {
    format!(
        "<<<<<<< HEAD\n{}=======\n{}>>>>>>>\n",
        current.unwrap_or(""),
        given.unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn oid(seed: &str) -> Option<ObjectId> {
        Some(ObjectId::digest(&[seed.as_bytes()]))
    }

    #[rstest]
    // created only by the current branch
    #[case(None, oid("a"), None, Resolution::Keep)]
    // created only by the given branch
    #[case(None, None, oid("a"), Resolution::TakeGiven)]
    // untouched here, deleted there
    #[case(oid("a"), oid("a"), None, Resolution::Remove)]
    // untouched there, deleted here
    #[case(oid("a"), None, oid("a"), Resolution::Keep)]
    // untouched here, changed there
    #[case(oid("a"), oid("a"), oid("b"), Resolution::TakeGiven)]
    // changed here, untouched there
    #[case(oid("a"), oid("b"), oid("a"), Resolution::Keep)]
    // unchanged everywhere
    #[case(oid("a"), oid("a"), oid("a"), Resolution::Keep)]
    // same change on both sides
    #[case(oid("a"), oid("b"), oid("b"), Resolution::Keep)]
    // deleted on both sides
    #[case(oid("a"), None, None, Resolution::Keep)]
    // untracked everywhere (stray working-tree file)
    #[case(None, None, None, Resolution::Keep)]
    // changed differently on both sides
    #[case(oid("a"), oid("b"), oid("c"), Resolution::Conflict)]
    // changed here, deleted there
    #[case(oid("a"), oid("b"), None, Resolution::Conflict)]
    // deleted here, changed there
    #[case(oid("a"), None, oid("b"), Resolution::Conflict)]
    // created differently on both sides
    #[case(None, oid("b"), oid("c"), Resolution::Conflict)]
    fn test_classification_table(
        #[case] split: Option<ObjectId>,
        #[case] current: Option<ObjectId>,
        #[case] given: Option<ObjectId>,
        #[case] expected: Resolution,
    ) {
        let resolution = classify(split.as_ref(), current.as_ref(), given.as_ref());
        assert_eq!(resolution, expected);
    }

    #[test]
    fn test_conflict_contents_concatenate_both_sides() {
        let contents = conflict_file_contents(Some("b"), Some("c"));
        assert_eq!(contents, "<<<<<<< HEAD\nb=======\nc>>>>>>>\n");
    }

    #[test]
    fn test_conflict_contents_treat_missing_sides_as_empty() {
        let contents = conflict_file_contents(Some("kept\n"), None);
        assert_eq!(contents, "<<<<<<< HEAD\nkept\n=======\n>>>>>>>\n");
    }
}
