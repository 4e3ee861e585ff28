use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

mod common;

fn state_arg(dir: &assert_fs::TempDir) -> String {
    dir.path().join(".bitlet").display().to_string()
}

#[test]
fn registering_the_same_remote_twice_is_refused() {
    let local = common::init_repo();
    let remote = common::init_repo();

    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::bitlet(local.path())
        .args(["add-remote", "origin", &state_arg(&remote)])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A remote with that name already exists.",
        ));
}

#[test]
fn forgetting_an_unknown_remote_is_refused() {
    let local = common::init_repo();

    common::bitlet(local.path())
        .args(["rm-remote", "origin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "A remote with that name does not exist.",
        ));
}

#[test]
fn a_forgotten_remote_can_be_registered_again() {
    let local = common::init_repo();
    let remote = common::init_repo();

    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);
    common::run(local.path(), &["rm-remote", "origin"]);
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);
}

#[test]
fn syncing_with_an_unregistered_remote_is_refused() {
    let local = common::init_repo();

    for command in ["push", "fetch"] {
        common::bitlet(local.path())
            .args([command, "origin", "master"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Remote directory not found."));
    }
}

#[test]
fn syncing_with_a_vanished_remote_directory_is_refused() {
    let local = common::init_repo();
    common::run(local.path(), &["add-remote", "origin", "/nowhere/.bitlet"]);

    common::bitlet(local.path())
        .args(["fetch", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote directory not found."));
}

#[test]
fn fetching_an_unknown_remote_branch_is_refused() {
    let local = common::init_repo();
    let remote = common::init_repo();
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::bitlet(local.path())
        .args(["fetch", "origin", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "That remote does not have that branch.",
        ));
}

#[test]
fn push_advances_the_remote_branch_to_the_local_tip() {
    let local = common::init_repo();
    let remote = common::init_repo();
    common::commit_file(local.path(), "ship.txt", "cargo\n", "ship it");
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::run(local.path(), &["push", "origin", "master"]);

    assert_eq!(
        common::branch_tip(remote.path(), "master"),
        common::branch_tip(local.path(), "master")
    );
    // the pushed history is retrievable in the remote
    let log = common::run(remote.path(), &["log"]);
    assert!(log.contains("ship it"));
}

#[test]
fn push_requires_the_remote_tip_to_be_local_history() {
    let local = common::init_repo();
    let remote = common::init_repo();
    // both sides move past the shared root commit independently
    common::commit_file(local.path(), "mine.txt", "local work\n", "local work");
    common::commit_file(remote.path(), "theirs.txt", "remote work\n", "remote work");
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::bitlet(local.path())
        .args(["push", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Please pull down remote changes before pushing.",
        ));
}

#[test]
fn fetch_creates_a_tracking_branch_at_the_remote_tip() {
    let local = common::init_repo();
    let remote = common::init_repo();
    common::commit_file(remote.path(), "theirs.txt", "remote work\n", "remote work");
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::run(local.path(), &["fetch", "origin", "master"]);

    assert_eq!(
        common::branch_tip(local.path(), "origin_master"),
        common::branch_tip(remote.path(), "master")
    );
    let status = common::run(local.path(), &["status"]);
    assert!(status.contains("origin_master"));
}

#[test]
fn pushed_history_fetched_into_a_third_repository_matches() {
    let author = common::init_repo();
    let hub = common::init_repo();
    let reader = common::init_repo();
    common::commit_file(author.path(), "story.txt", "chapter one\n", "chapter one");

    common::run(author.path(), &["add-remote", "hub", &state_arg(&hub)]);
    common::run(author.path(), &["push", "hub", "master"]);

    common::run(reader.path(), &["add-remote", "hub", &state_arg(&hub)]);
    common::run(reader.path(), &["fetch", "hub", "master"]);

    // the fetched tip id equals the pushed tip id
    assert_eq!(
        common::branch_tip(reader.path(), "hub_master"),
        common::branch_tip(author.path(), "master")
    );

    // and the whole ancestor chain is retrievable from the reader's store:
    // checking the tracking branch out walks it end to end
    common::run(reader.path(), &["checkout", "hub/master"]);
    let log = common::run(reader.path(), &["log"]);
    assert!(log.contains("chapter one"));
    assert!(log.contains("initial commit"));
}

#[test]
fn fetching_twice_copies_nothing_new() {
    let local = common::init_repo();
    let remote = common::init_repo();
    common::commit_file(remote.path(), "theirs.txt", "remote work\n", "remote work");
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::run(local.path(), &["fetch", "origin", "master"]);
    let objects = count_objects(&local.path().join(".bitlet").join("objects"));
    common::run(local.path(), &["fetch", "origin", "master"]);

    assert_eq!(
        count_objects(&local.path().join(".bitlet").join("objects")),
        objects
    );
}

#[test]
fn pull_fast_forwards_onto_the_remote_work() {
    let local = common::init_repo();
    let remote = common::init_repo();
    common::commit_file(remote.path(), "theirs.txt", "remote work\n", "remote work");
    common::run(local.path(), &["add-remote", "origin", &state_arg(&remote)]);

    common::bitlet(local.path())
        .args(["pull", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current branch fast-forwarded."));

    let log = common::run(local.path(), &["log"]);
    assert!(log.contains("remote work"));
}

fn count_objects(dir: &std::path::Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).expect("read objects dir") {
        let entry = entry.expect("dir entry");
        if entry.path().is_dir() {
            count += count_objects(&entry.path());
        } else {
            count += 1;
        }
    }
    count
}
