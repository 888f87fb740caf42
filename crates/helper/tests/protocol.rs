//! The helper's process interface: argv, stdio and exit codes

mod common;

use common::Sandbox;
use predicates::prelude::*;

#[test]
fn token_commands() {
    let sandbox = Sandbox::new();

    sandbox.command().args(["has-token"]).assert().code(1);
    sandbox
        .command()
        .args(["get-token"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());

    sandbox
        .command()
        .args(["set-token"])
        .write_stdin("rg_default\n")
        .assert()
        .success();
    sandbox.command().args(["has-token", "rubygems"]).assert().success();
    sandbox
        .command()
        .args(["get-token", "RUBYGEMS_API_KEY"])
        .assert()
        .success()
        .stdout("rg_default\n");

    sandbox
        .command()
        .args(["set-token", "https://gems.example.com"])
        .write_stdin("rg_example\n")
        .assert()
        .success();
    sandbox
        .command()
        .args(["list-tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rubygems\n").and(predicate::str::contains(
            "https://gems.example.com\n",
        )));

    sandbox
        .command()
        .args(["rm-token", "https://gems.example.com"])
        .assert()
        .success();
    sandbox
        .command()
        .args(["rm-token", "https://gems.example.com"])
        .assert()
        .success();
    sandbox
        .command()
        .args(["list-tokens"])
        .assert()
        .success()
        .stdout("rubygems\n");
}

#[test]
fn empty_store_lists_nothing() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["list-tokens"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn set_token_without_input_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["set-token"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: usage error"));
}

#[test]
fn usage_errors_exit_2_on_stderr() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
    sandbox
        .command()
        .args(["add-api-key"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
    sandbox.command().args(["has-key", "extra"]).assert().code(2);
    sandbox
        .command()
        .args(["--help"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn key_and_certificate_commands() {
    let sandbox = Sandbox::new();

    sandbox.command().args(["has-key"]).assert().code(1);
    sandbox
        .command()
        .args(["get-cert"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no signing key"));
    sandbox
        .command()
        .args(["sign"])
        .write_stdin("data")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no signing key"));

    sandbox.command().args(["generate-key"]).assert().success();
    sandbox.command().args(["has-key"]).assert().success();
    sandbox
        .command()
        .args(["generate-key"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    sandbox
        .command()
        .args(["sign"])
        .write_stdin("data")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no signing certificate"));

    sandbox
        .command()
        .args(["get-cert"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-----BEGIN CERTIFICATE-----"));
    sandbox
        .command()
        .args(["sign"])
        .write_stdin("data")
        .assert()
        .success()
        .stdout(predicate::function(|out: &[u8]| out.len() == 128));
}

#[test]
fn import_rejects_garbage() {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["import-key"])
        .write_stdin("not a key")
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: "));
    sandbox.command().args(["has-key"]).assert().code(1);
}

#[test]
fn broken_store_is_an_operational_failure() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.store_dir(), b"in the way").unwrap();

    // Absence would be exit 1; a store that cannot be read is exit 2
    sandbox
        .command()
        .args(["get-token"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error: "));
    sandbox.command().args(["has-token"]).assert().code(2);
    sandbox.command().args(["list-tokens"]).assert().code(2);
}

#[test]
fn invalid_config_fails_every_command() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.path().join("helper.json"), r#"{"key_bits": 64}"#).unwrap();
    sandbox
        .command()
        .args(["has-token"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("key_bits"));
}
