//! CLI-level integration tests for the `spellc` binary, driven end to end
//! through `assert_cmd` against the fixtures in `tests/fixtures/`.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn spellc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_spellc"))
}

#[test]
fn help_output_mentions_subcommands() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("check").and(predicate::str::contains("emit")));
}

#[test]
fn version_flag_prints_version() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("spellc"));
}

#[test]
fn check_prints_inferred_return_type() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("check").arg(fixtures_dir().join("return_literal.spell"));
    cmd.assert().success().stdout(predicate::str::diff("number\n"));
}

#[test]
fn emit_prints_generated_code() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("emit").arg(fixtures_dir().join("return_literal.spell"));
    cmd.assert().success().stdout(predicate::str::diff("return 42;\n"));
}

#[test]
fn check_with_context_resolves_host_types() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("check")
        .arg(fixtures_dir().join("spell_filter.spell"))
        .arg("--context")
        .arg(fixtures_dir().join("spell_filter.json"));
    cmd.assert().success().stdout(predicate::str::diff("Spell[]\n"));
}

#[test]
fn emit_with_context_awaits_the_undeclared_root() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("emit")
        .arg(fixtures_dir().join("spell_filter.spell"))
        .arg("--context")
        .arg(fixtures_dir().join("spell_filter.json"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(await casting).spells.filter"));
}

#[test]
fn emit_with_return_type_prefixes_a_comment() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("emit")
        .arg(fixtures_dir().join("return_literal.spell"))
        .arg("--with-return-type");
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("// returnType: number"));
}

#[test]
fn syntax_error_exits_nonzero_with_line_number() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("check").arg(fixtures_dir().join("syntax_error.spell"));
    cmd.assert().failure().stderr(predicate::str::contains("at line"));
}

#[test]
fn missing_file_exits_nonzero() {
    let mut cmd = Command::new(spellc_bin());
    cmd.arg("check").arg(fixtures_dir().join("does_not_exist.spell"));
    cmd.assert().failure();
}
