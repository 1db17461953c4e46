//! 渐进修复模块
//!
//! 只做一件事：给缺少 ':' 的块头行补上 ':'。
//! 不动缩进、空行或其他内容，避免引入错误修正。

use regex::Regex;
use std::sync::OnceLock;

/// 块终止符
pub const BLOCK_TERMINATOR: char = ':';

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^\s*(if|elif|else|for|while|def|class|with|try|except|finally)\b(.*)$")
            .expect("header regex is valid")
    })
}

/// 该行是否为缺少终止符的块头
pub fn needs_terminator(line: &str) -> bool {
    let line = line.trim_end();
    header_regex().is_match(line) && !line.ends_with(BLOCK_TERMINATOR)
}

/// 对源码做一次最小修复
///
/// 幂等：已经以 ':' 结尾的块头保持不变。
pub fn repair(code: &str) -> String {
    let mut fixed: Vec<String> = code
        .lines()
        .map(|line| {
            if needs_terminator(line) {
                format!("{}{}", line.trim_end(), BLOCK_TERMINATOR)
            } else {
                line.to_string()
            }
        })
        .collect();

    if code.ends_with('\n') {
        fixed.push(String::new());
    }
    fixed.join("\n")
}
