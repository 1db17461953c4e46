//! 命令行黑盒测试

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn pyexpert(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pyexpert").expect("pyexpert binary");
    cmd.arg("--db")
        .arg(temp.path().join("kb.db"))
        .arg("--config")
        .arg(temp.path().join("config.json"))
        .env_remove("PYEXPERT_DB")
        .env_remove("PYEXPERT_PYTHON")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_input_is_usage_error() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pyexpert --error"));

    // 未进入推理，不应创建知识库
    assert!(!temp.path().join("kb.db").exists());
}

#[test]
fn test_blank_error_message_is_usage_error() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .args(["--error", "   "])
        .write_stdin("")
        .assert()
        .code(1);
}

#[test]
fn test_error_message_only() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .args(["-e", "TypeError: can't concatenate str and int"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== 诊断报告 ==="))
        .stdout(predicate::str::contains("#1. [TypeMismatch]"))
        .stdout(predicate::str::contains("SEMANTIC"))
        .stdout(predicate::str::contains("#2.").not());
}

#[test]
fn test_unknown_message_has_no_findings() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .args(["--error", "SomethingOdd: nobody knows"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("未检测到错误"));
}

#[test]
fn test_json_output() {
    let temp = tempfile::tempdir().unwrap();

    let output = pyexpert(&temp)
        .args(["--json", "-e", "ZeroDivisionError: division by zero"])
        .write_stdin("")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["error"], "DivisionByZero");
    assert_eq!(entries[0]["category"], "RUNTIME");
    assert_eq!(entries[0]["index"], 1);
}

#[test]
fn test_missing_file_is_fatal() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .arg(temp.path().join("missing.py"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.py"));
}

#[test]
fn test_export_then_import() {
    let temp = tempfile::tempdir().unwrap();

    let output = pyexpert(&temp).arg("--export-kb").output().unwrap();
    assert!(output.status.success());
    let mut snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(!snapshot["rules"].as_array().unwrap().is_empty());

    // 新增一个错误类型和一条规则
    snapshot["error_types"] = serde_json::json!([{
        "id": 100,
        "name": "RecursionTooDeep",
        "category": "RUNTIME",
        "severity": 1,
        "explanation": "递归层数过深",
        "suggestion": "检查递归终止条件"
    }]);
    snapshot["rules"] = serde_json::json!([{
        "id": 100,
        "name": "RecursionLimit",
        "kind": "message",
        "pattern_regex": "RecursionError: maximum recursion depth",
        "conclusion_error_type_id": 100,
        "diag_text": "递归超过最大深度",
        "priority": 70
    }]);
    let import_path = temp.path().join("extra.json");
    fs::write(&import_path, snapshot.to_string()).unwrap();

    pyexpert(&temp)
        .arg("--import-kb")
        .arg(&import_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 个错误类型, 1 条规则"));

    pyexpert(&temp)
        .args(["-e", "RecursionError: maximum recursion depth exceeded"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("[RecursionTooDeep] 递归超过最大深度"));
}

#[test]
fn test_init_config_writes_overrides() {
    let temp = tempfile::tempdir().unwrap();

    pyexpert(&temp)
        .args(["--init-config", "--python", "python3.12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));

    let content = fs::read_to_string(temp.path().join("config.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(config["python_program"], "python3.12");
    assert_eq!(
        config["database_path"].as_str(),
        temp.path().join("kb.db").to_str()
    );
    assert_eq!(config["runtime_enabled"], true);

    // 只写配置，不创建知识库
    assert!(!temp.path().join("kb.db").exists());
}
