use crate::core::models::{Finding, KnowledgeBase};
use crate::core::python::PythonInterpreter;
use crate::core::rule_engine::{InferenceEngine, CODE_MATCH_EVIDENCE, POST_FIX_TAG};
use crate::storage::database::Database;
use tempfile::tempdir;

fn seeded_kb() -> KnowledgeBase {
    let dir = tempdir().unwrap();
    let mut db = Database::open(&dir.path().join("kb.db")).unwrap();
    db.seed_builtin().unwrap();
    db.load_knowledge_base().unwrap()
}

fn python() -> Option<PythonInterpreter> {
    let py = PythonInterpreter::new("python3");
    if py.is_available() {
        Some(py)
    } else {
        eprintln!("python3 不可用，跳过");
        None
    }
}

fn infer(kb: &KnowledgeBase, py: &PythonInterpreter, code: &str, message: Option<&str>, runtime: bool) -> Vec<Finding> {
    InferenceEngine::new(kb, py, py).infer(code, message, runtime)
}

#[test]
fn sim_missing_colon_is_repaired_and_executed() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let findings = infer(&kb, &py, "if x > 0\n    print('ok')", None, true);

    // 静态模式命中
    assert!(findings
        .iter()
        .any(|f| f.rule == "IfMissingColon" && f.evidence == CODE_MATCH_EVIDENCE));

    // 解析器故障作为证据
    assert!(findings
        .iter()
        .any(|f| f.category == "SYNTACTIC" && f.evidence != CODE_MATCH_EVIDENCE));

    // 修复后执行，x 未定义
    let post_fix = findings
        .iter()
        .find(|f| f.diagnosis.ends_with(POST_FIX_TAG))
        .expect("post-fix finding");
    assert_eq!(post_fix.rule, "NameNotDefined");
    assert_eq!(post_fix.evidence, "NameError: name 'x' is not defined");
}

#[test]
fn sim_runtime_pass_disabled_has_no_post_fix() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let findings = infer(&kb, &py, "if x > 0\n    print('ok')", None, false);

    assert!(!findings.is_empty());
    assert!(findings.iter().all(|f| !f.diagnosis.contains(POST_FIX_TAG)));
    assert!(findings.iter().all(|f| f.rule != "NameNotDefined"));
}

#[test]
fn sim_external_message_only() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let findings = infer(&kb, &py, "", Some("TypeError: can't concatenate str and int"), true);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, "SEMANTIC");
    assert_eq!(findings[0].evidence, "TypeError: can't concatenate str and int");
}

#[test]
fn sim_clean_code_has_no_findings() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let code = "def add(a, b):\n    return a + b\n\ntotal = add(1, 2)\n";
    assert!(infer(&kb, &py, code, None, true).is_empty());
}

#[test]
fn sim_valid_headers_are_not_flagged() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let code = "import os\n\
                def check(flag=True):\n    return flag\n\
                a = 1\nb = 2\n\
                if (a and\n        b):\n    os.system('echo ok')\n\
                if check(flag=False) or a:\n    pass\n\
                if (n := 10) > 5:\n    pass\n";
    assert!(infer(&kb, &py, code, None, true).is_empty());
}

#[test]
fn sim_runtime_fault_in_valid_code() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let code = "items = [1, 2, 3]\nprint(items[5])\n";
    let findings = infer(&kb, &py, code, None, true);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].error, "IndexOutOfRange");
    assert_eq!(findings[0].category, "RUNTIME");
    assert!(!findings[0].diagnosis.contains(POST_FIX_TAG));
}

#[test]
fn sim_results_are_deterministic_and_unique() {
    let Some(py) = python() else { return };
    let kb = seeded_kb();

    let code = "for i in range(3)\n    total = total + i\nwhile i > 0\n    i -= 1\n";
    let first = infer(&kb, &py, code, Some("NameError: name 'total' is not defined"), true);
    let second = infer(&kb, &py, code, Some("NameError: name 'total' is not defined"), true);
    assert_eq!(first, second);

    let mut keys: Vec<_> = first.iter().map(|f| f.dedup_key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}
