//! 规则模式匹配器
//!
//! 规则的正则在装载时编译一次，之后在各轮推理中只读共享。
//! 外部只依赖 `matches`，底层用什么引擎是实现细节。

use regex::{Regex, RegexBuilder};

/// 已编译的规则模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// 编译模式（多行 + 忽略大小写）
    pub fn compile(source: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source)
            .multi_line(true)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// 文本中是否存在匹配
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// 原始模式字符串
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
