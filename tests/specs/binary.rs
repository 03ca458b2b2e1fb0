use assert_cmd::Command;

#[test]
fn matchd_version_flag_exits_cleanly() {
    Command::cargo_bin("matchd")
        .expect("matchd binary should build")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn matchd_rejects_unknown_arguments() {
    Command::cargo_bin("matchd")
        .expect("matchd binary should build")
        .arg("--bogus")
        .assert()
        .failure();
}
