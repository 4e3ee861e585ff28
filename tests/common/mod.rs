#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

pub fn bitlet(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bitlet").expect("bitlet binary");
    cmd.current_dir(dir);
    cmd
}

/// Run a command that is expected to exit cleanly and return its stdout.
/// Precondition failures also exit cleanly, with their message on stdout.
pub fn run(dir: &Path, args: &[&str]) -> String {
    let assert = bitlet(dir).args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8 output")
}

pub fn init_repo() -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().expect("temp dir");
    run(dir.path(), &["init"]);
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write working file");
}

pub fn read_file(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("read working file")
}

pub fn file_exists(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
}

/// Write, stage and commit one file in a single step.
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    write_file(dir, name, content);
    run(dir, &["add", name]);
    run(dir, &["commit", message]);
}

/// The commit id a branch file points at, read from the persisted ref.
pub fn branch_tip(dir: &Path, disk_name: &str) -> String {
    let content =
        std::fs::read_to_string(dir.join(".bitlet").join("refs").join("heads").join(disk_name))
            .expect("read branch file");

    content
        .lines()
        .find_map(|line| line.strip_prefix("head "))
        .expect("branch head line")
        .trim()
        .to_string()
}
