//! 核心数据模型定义
//!
//! 知识库实体（ErrorType / Rule）装载后只读；Finding 是每次推理临时生成的输出单元。

use crate::core::error::RuleError;
use crate::core::pattern::CompiledPattern;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;

/// 错误类型
/// 规则推理得出的结论，附带解释与修复建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorType {
    /// 唯一ID
    pub id: i64,
    /// 名称（如 NameNotDefined）
    pub name: String,
    /// 粗分类（SYNTACTIC / SEMANTIC / RUNTIME）
    pub category: String,
    /// 严重程度（序数）
    pub severity: i32,
    /// 面向学习者的解释
    pub explanation: String,
    /// 修复建议
    pub suggestion: String,
}

/// 规则证据通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// 匹配源代码文本
    Code,
    /// 匹配错误消息（外部传入、解析器或运行时产生）
    Message,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Code => "code",
            RuleKind::Message => "message",
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(RuleKind::Code),
            "message" => Ok(RuleKind::Message),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规则定义（持久化形式，模式尚未编译）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: i64,
    pub name: String,
    pub kind: RuleKind,
    pub pattern_regex: String,
    pub conclusion_error_type_id: i64,
    pub diag_text: String,
    /// 优先级（数字越小越先评估）
    pub priority: i32,
}

/// 已编译的规则
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: i64,
    pub name: String,
    pub kind: RuleKind,
    pub pattern: CompiledPattern,
    pub conclusion_id: i64,
    pub diag_text: String,
    pub priority: i32,
}

impl Rule {
    /// 编译规则定义
    pub fn compile(def: RuleDefinition) -> Result<Self, RuleError> {
        let pattern =
            CompiledPattern::compile(&def.pattern_regex).map_err(|source| RuleError::InvalidPattern {
                rule: def.name.clone(),
                source,
            })?;

        Ok(Self {
            id: def.id,
            name: def.name,
            kind: def.kind,
            pattern,
            conclusion_id: def.conclusion_error_type_id,
            diag_text: def.diag_text,
            priority: def.priority,
        })
    }
}

/// 知识库
/// 作为参数显式传给推理引擎，不使用全局状态
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    error_types: HashMap<i64, ErrorType>,
    /// 按 (priority, id) 升序
    rules: Vec<Rule>,
}

impl KnowledgeBase {
    /// 构建知识库
    ///
    /// 模式无效或结论不存在的规则被丢弃并记录警告，装载继续。
    pub fn new(error_types: Vec<ErrorType>, definitions: Vec<RuleDefinition>) -> Self {
        let error_types: HashMap<i64, ErrorType> =
            error_types.into_iter().map(|et| (et.id, et)).collect();

        let mut rules = Vec::with_capacity(definitions.len());
        for def in definitions {
            if !error_types.contains_key(&def.conclusion_error_type_id) {
                let err = RuleError::UnresolvedConclusion {
                    rule: def.name.clone(),
                    conclusion_id: def.conclusion_error_type_id,
                };
                tracing::warn!("跳过规则: {}", err);
                continue;
            }

            match Rule::compile(def) {
                Ok(rule) => rules.push(rule),
                Err(err) => tracing::warn!("跳过规则: {}", err),
            }
        }

        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));

        Self { error_types, rules }
    }

    /// 按ID查找错误类型
    pub fn error_type(&self, id: i64) -> Option<&ErrorType> {
        self.error_types.get(&id)
    }

    /// 所有规则（已排序）
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 指定通道的规则，保持排序
    pub fn rules_of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.kind == kind)
    }

    pub fn error_type_count(&self) -> usize {
        self.error_types.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// 诊断结论
/// 推理引擎唯一的输出单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 命中的规则名
    pub rule: String,
    /// 结论错误类型名
    pub error: String,
    pub category: String,
    /// 诊断文本（修复后发现的会追加标记）
    pub diagnosis: String,
    pub explanation: String,
    pub suggestion: String,
    /// 触发匹配的证据
    pub evidence: String,
}

impl Finding {
    pub fn new(rule: &Rule, error_type: &ErrorType, evidence: impl Into<String>) -> Self {
        Self {
            rule: rule.name.clone(),
            error: error_type.name.clone(),
            category: error_type.category.clone(),
            diagnosis: rule.diag_text.clone(),
            explanation: error_type.explanation.clone(),
            suggestion: error_type.suggestion.clone(),
            evidence: evidence.into(),
        }
    }

    /// 去重键
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.rule, &self.error, &self.evidence)
    }

    /// 基于去重键的稳定指纹
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.rule.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.error.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.evidence.as_bytes());
        hex::encode(&hasher.finalize()[..16])
    }
}

/// 排序并去重
///
/// 先按 (category, error, rule) 稳定排序，再按去重键保留第一次出现的结论。
pub fn finalize_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.error.cmp(&b.error))
            .then_with(|| a.rule.cmp(&b.rule))
    });

    let mut seen = HashSet::new();
    findings.retain(|f| {
        let (rule, error, evidence) = f.dedup_key();
        seen.insert((rule.to_string(), error.to_string(), evidence.to_string()))
    });
    findings
}

/// 知识库快照（导入/导出用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KbSnapshot {
    #[serde(default)]
    pub error_types: Vec<ErrorType>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 知识库数据库路径（为空时使用数据目录下的 knowledge.db）
    pub database_path: Option<PathBuf>,
    /// Python 解释器
    pub python_program: String,
    /// 是否启用运行时探测（第4轮）
    pub runtime_enabled: bool,
    /// 空数据库是否写入内置知识库
    pub seed_builtin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            python_program: "python3".to_string(),
            runtime_enabled: true,
            seed_builtin: true,
        }
    }
}
