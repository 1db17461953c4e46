//! 诊断报告输出

use crate::core::models::Finding;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

/// 没有任何结论时的提示
pub const NO_FINDINGS: &str = "根据当前规则未检测到错误。";

/// 使用说明（没有代码也没有错误消息时输出）
pub const USAGE_HINT: &str = "未收到代码或错误消息。
用法:
  1) pyexpert your_file.py
  2) cat your_file.py | pyexpert
  3) printf \"if x > 0\\n    print('ok')\" | pyexpert
  4) pyexpert --error \"TypeError: can't concatenate str and int\"";

/// 文本报告
pub fn render_text(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return format!("{}\n", NO_FINDINGS);
    }

    let mut out = String::from("=== 诊断报告 ===\n");
    for (i, f) in findings.iter().enumerate() {
        // 写入 String 不会失败
        let _ = write!(
            out,
            "\n#{}. [{}] {}\n 类别:  {}\n 解释:  {}\n 建议:  {}\n 证据:  {}\n",
            i + 1,
            f.error,
            f.diagnosis,
            f.category,
            f.explanation,
            f.suggestion,
            f.evidence
        );
    }
    out
}

#[derive(Serialize)]
struct FindingEntry<'a> {
    index: usize,
    fingerprint: String,
    #[serde(flatten)]
    finding: &'a Finding,
}

/// JSON 报告
pub fn render_json(findings: &[Finding]) -> Result<String> {
    let entries: Vec<_> = findings
        .iter()
        .enumerate()
        .map(|(i, finding)| FindingEntry {
            index: i + 1,
            fingerprint: finding.fingerprint(),
            finding,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}
