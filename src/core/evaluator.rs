//! 运行时求值模块
//!
//! 在空命名空间中执行源码，只捕获第一个运行时故障。
//! 仅用于教学或可信代码，不提供任何安全隔离。

use crate::core::error::ProbeError;

/// 沙箱求值器
///
/// 每次调用都必须使用全新的命名空间，不允许跨调用复用。
pub trait Evaluator {
    /// 执行源码；`Ok(None)` 表示没有故障，
    /// 否则返回 `<FaultKind>: <message>` 形式的故障文本
    fn evaluate(&self, code: &str) -> Result<Option<String>, ProbeError>;
}

/// 规范化运行时故障文本
pub fn format_fault(kind: &str, message: &str) -> String {
    format!("{}: {}", kind, message)
}
