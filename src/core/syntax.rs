//! 语法检查模块
//!
//! 解析失败本身就是证据：故障文本交给 message 规则匹配，
//! 同时给出结构化分类，供渐进修复判断是否缺少块终止符。

use crate::core::error::ProbeError;
use crate::core::repair;

/// 解析器报告缺少 ':' 时的细节文本
const MISSING_TERMINATOR_DETAIL: &str = "expected ':'";

/// 语法故障分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// 块头缺少终止符
    MissingBlockTerminator,
    Other,
}

/// 语法故障
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFault {
    /// 解析器原样输出的故障消息
    pub message: String,
    /// 出错行号（从1开始）
    pub line: Option<usize>,
    /// 出错行文本
    pub line_text: Option<String>,
    pub class: FaultClass,
}

impl SyntaxFault {
    /// 创建故障并分类
    ///
    /// `detail` 是解析器不带位置信息的简短描述，缺失时退回到 `message`。
    pub fn new(
        message: impl Into<String>,
        detail: Option<&str>,
        line: Option<usize>,
        line_text: Option<String>,
    ) -> Self {
        let message = message.into();
        let detail = detail.unwrap_or(&message);

        let class = if detail.contains(MISSING_TERMINATOR_DETAIL)
            || line_text.as_deref().is_some_and(repair::needs_terminator)
        {
            FaultClass::MissingBlockTerminator
        } else {
            FaultClass::Other
        };

        Self {
            message,
            line,
            line_text,
            class,
        }
    }

    pub fn is_missing_terminator(&self) -> bool {
        self.class == FaultClass::MissingBlockTerminator
    }
}

/// 语法检查器
pub trait SyntaxChecker {
    /// 解析源码；`Ok(None)` 表示解析成功
    fn check(&self, code: &str) -> Result<Option<SyntaxFault>, ProbeError>;
}
