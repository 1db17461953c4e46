//! Python 解释器探针
//!
//! 语法检查和沙箱求值都交给真实解释器完成：每次调用启动一个新进程，
//! 源码从 stdin 传入，结果以单行 JSON 从 stdout 返回。
//! 新进程保证求值命名空间不会跨调用复用。

use crate::core::error::ProbeError;
use crate::core::evaluator::{self, Evaluator};
use crate::core::syntax::{SyntaxChecker, SyntaxFault};
use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// 探针脚本
///
/// 报告写入复制出的原始 fd 1。fd 1 和 fd 2 被重定向到空设备，
/// 子进程和 `sys.__stdout__` 的输出不会混入报告；
/// `print` 的输出另外截获到 `output`。
const PROBE_SCRIPT: &str = r#"
import ast, io, json, os, sys
mode = sys.argv[1]
source = sys.stdin.buffer.read().decode("utf-8")
report_fd = os.dup(1)
null_fd = os.open(os.devnull, os.O_WRONLY)
os.dup2(null_fd, 1)
report = {}
if mode == "parse":
    try:
        ast.parse(source)
    except SyntaxError as e:
        report = {"fault": str(e), "detail": e.msg, "line": e.lineno, "text": e.text}
else:
    err_fd = os.dup(2)
    os.dup2(null_fd, 2)
    sink = io.StringIO()
    sys.stdout = sys.stderr = sink
    try:
        exec(compile(source, "<code>", "exec"), {})
    except SystemExit:
        pass
    except Exception as e:
        report = {"kind": type(e).__name__, "fault": str(e)}
    finally:
        sys.stdout, sys.stderr = sys.__stdout__, sys.__stderr__
        os.dup2(err_fd, 2)
    report["output"] = sink.getvalue()
with os.fdopen(report_fd, "w", encoding="utf-8") as out:
    out.write(json.dumps(report))
"#;

/// 探针模式
#[derive(Debug, Clone, Copy)]
enum ProbeMode {
    Parse,
    Execute,
}

impl ProbeMode {
    fn as_arg(&self) -> &'static str {
        match self {
            ProbeMode::Parse => "parse",
            ProbeMode::Execute => "exec",
        }
    }
}

/// 探针报告
#[derive(Debug, Default, Deserialize)]
struct ProbeReport {
    fault: Option<String>,
    /// 异常类型名（执行模式）
    kind: Option<String>,
    /// 不带位置信息的语法错误描述（解析模式）
    detail: Option<String>,
    line: Option<usize>,
    text: Option<String>,
    output: Option<String>,
}

/// Python 解释器
#[derive(Debug, Clone)]
pub struct PythonInterpreter {
    program: String,
}

impl PythonInterpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 解释器是否可用
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run(&self, mode: ProbeMode, code: &str) -> Result<ProbeReport, ProbeError> {
        let mut child = Command::new(&self.program)
            .args(["-I", "-c", PROBE_SCRIPT, mode.as_arg()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // 脚本先读完 stdin 再输出，这里写完即关闭
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ProbeError::Exited {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(serde_json::from_str(stdout.trim())?)
    }
}

impl SyntaxChecker for PythonInterpreter {
    fn check(&self, code: &str) -> Result<Option<SyntaxFault>, ProbeError> {
        let report = self.run(ProbeMode::Parse, code)?;

        Ok(report.fault.map(|message| {
            SyntaxFault::new(message, report.detail.as_deref(), report.line, report.text)
        }))
    }
}

impl Evaluator for PythonInterpreter {
    fn evaluate(&self, code: &str) -> Result<Option<String>, ProbeError> {
        let report = self.run(ProbeMode::Execute, code)?;

        if let Some(captured) = report.output.as_deref().filter(|s| !s.is_empty()) {
            tracing::debug!("程序输出:\n{}", captured);
        }

        let Some(kind) = report.kind else {
            return Ok(None);
        };
        let fault = evaluator::format_fault(&kind, report.fault.as_deref().unwrap_or_default());
        tracing::debug!("执行时异常: {}", fault);
        Ok(Some(fault))
    }
}
