//! End-to-end tests of the `allele-def` command line.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn allele_def() -> Command {
    Command::cargo_bin("allele-def").unwrap()
}

const CYP2C19: &str = "CYP2C19.allele.translation.tsv";
const CYP2C9_B37: &str = "CYP2C9.b37.allele.translation.tsv";

#[test]
fn test_convert_writes_definition() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C19))
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CYP2C19: 3 variants, 3 named alleles"));

    let written =
        std::fs::read_to_string(out.path().join("CYP2C19.allele.definition.tsv")).unwrap();
    assert!(written.starts_with("FormatVersion\t1\nGeneName\tCYP2C19\n"));
    assert!(written.contains("\nGenomeBuild\tb38\n"));
    assert!(written.contains("\nAllele\t\t*2\tNo function\tC\t-\tG\n"));
    assert!(written.contains("\nNote\tThe first note.\n"));
}

#[test]
fn test_unsupported_build_writes_nothing() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C9_B37))
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("genome build b37 is not permitted"))
        .stderr(predicate::str::contains("1 of 1 files failed"));

    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_build_policy_from_command_line() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C9_B37))
        .arg("-o")
        .arg(out.path())
        .args(["--build", "b37", "--build", "b38"])
        .assert()
        .success();

    let written = std::fs::read_to_string(out.path().join("CYP2C9.allele.definition.tsv")).unwrap();
    assert!(written.contains("\nGenomeBuild\tb37\n"));
    assert!(written.contains("\nChrRefSeq\tNC_000010.10\n"));
}

#[test]
fn test_failed_table_does_not_stop_others() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::copy(fixture(CYP2C19), input.path().join(CYP2C19)).unwrap();
    std::fs::copy(fixture(CYP2C9_B37), input.path().join(CYP2C9_B37)).unwrap();

    allele_def()
        .arg("convert")
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 files failed"));

    assert!(out.path().join("CYP2C19.allele.definition.tsv").exists());
    assert!(!out.path().join("CYP2C9.allele.definition.tsv").exists());
}

#[test]
fn test_same_gene_written_once() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let table = std::fs::read_to_string(fixture(CYP2C19)).unwrap();
    std::fs::write(input.path().join(CYP2C19), &table).unwrap();
    std::fs::write(
        input.path().join("CYP2C19_old.allele.translation.tsv"),
        table.replace("No function", "Decreased function"),
    )
    .unwrap();

    allele_def()
        .arg("convert")
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "gene CYP2C19 is already converted from",
        ))
        .stderr(predicate::str::contains("1 of 2 files failed"));

    let written =
        std::fs::read_to_string(out.path().join("CYP2C19.allele.definition.tsv")).unwrap();
    assert!(written.contains("\tNo function\t"));
    assert!(!written.contains("Decreased function"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 1);
}

#[test]
fn test_convert_json_with_haplotype_ids() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C19))
        .arg("-o")
        .arg(out.path())
        .args(["--output-format", "json", "--version-tag", "r3"])
        .arg("--haplotype-ids")
        .arg(fixture("haplotype_ids.json"))
        .assert()
        .success();

    let json = std::fs::read_to_string(out.path().join("CYP2C19.allele.definition.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["gene_symbol"], "CYP2C19");
    assert_eq!(value["version_tag"], "r3");
    assert_eq!(value["named_alleles"][1]["id"], "PA165980635");
    assert!(value["named_alleles"][2].get("id").is_none());
    assert_eq!(value["populations"][0], "European");
}

#[test]
fn test_validate_json_summary() {
    let output = allele_def()
        .args(["validate", "--format", "json"])
        .arg(fixture(CYP2C19))
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary[0]["gene"], "CYP2C19");
    assert_eq!(summary[0]["variants"], 3);
    assert!(summary[0].get("error").is_none());
}

#[test]
fn test_validate_tsv_summary_reports_failure() {
    allele_def()
        .args(["validate", "--format", "tsv"])
        .arg(fixture(CYP2C9_B37))
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("input\tstatus\t"))
        .stdout(predicate::str::contains("\tfailed\t"));
}

#[test]
fn test_validate_generated_output() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C19))
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    allele_def()
        .args(["validate", "--generated"])
        .arg(out.path().join("CYP2C19.allele.definition.tsv"))
        .assert()
        .success();
}

#[test]
fn test_validate_generated_json() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C19))
        .arg("-o")
        .arg(out.path())
        .args(["--output-format", "json"])
        .assert()
        .success();

    allele_def()
        .args(["validate", "--generated"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CYP2C19: 3 variants, 3 named alleles"));
}

#[test]
fn test_validate_generated_without_alleles() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("convert")
        .arg(fixture(CYP2C19))
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    let path = out.path().join("CYP2C19.allele.definition.tsv");
    let stripped: String = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with("Allele\t"))
        .map(|line| format!("{line}\n"))
        .collect();
    std::fs::write(&path, stripped).unwrap();

    allele_def()
        .args(["validate", "--generated"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("No named alleles defined"));
}

#[test]
fn test_missing_input() {
    let out = tempfile::tempdir().unwrap();

    allele_def()
        .arg("xlsx")
        .arg(out.path().join("CYP2C19.xlsx"))
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input not found"));
}

#[test]
fn test_xlsx_directory_without_spreadsheets() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("~$CYP2C19.xlsx"), "lock").unwrap();

    allele_def()
        .arg("xlsx")
        .arg(input.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files found"));
}
