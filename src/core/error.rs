//! 错误类型定义
//!
//! 这里只放"可恢复"的协作方错误：规则装载失败时丢弃该规则，
//! 解释器探针失败时该轮推理视为没有证据。两者都不会向调用方传播。

use std::process::ExitStatus;

/// 规则装载错误（配置错误，只影响单条规则）
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("规则 '{rule}' 的正则无效: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("规则 '{rule}' 的类型未知: {kind}")]
    UnknownKind { rule: String, kind: String },

    #[error("规则 '{rule}' 的结论错误类型不存在: {conclusion_id}")]
    UnresolvedConclusion { rule: String, conclusion_id: i64 },
}

/// 解释器探针错误
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("无法启动解释器 '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("与解释器通信失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("解释器异常退出 ({status}): {stderr}")]
    Exited { status: ExitStatus, stderr: String },

    #[error("解释器输出无法解析: {0}")]
    Protocol(#[from] serde_json::Error),
}
