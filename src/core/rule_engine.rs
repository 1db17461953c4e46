//! 推理引擎模块
//!
//! 前向链式规则匹配：对源码和错误消息两个证据通道依次执行四轮推理，
//! 最后排序去重得到诊断结论。
//!
//! 四轮推理：
//! 1. 外部错误消息 → message 规则
//! 2. 解析失败消息 → message 规则
//! 3. 源码文本 → code 规则
//! 4. 运行时故障（必要时先做渐进修复）→ message 规则
//!
//! 任何一轮中的故障都是证据，不会作为错误抛给调用方。

use crate::core::evaluator::Evaluator;
use crate::core::models::{finalize_findings, Finding, KnowledgeBase, RuleKind};
use crate::core::repair;
use crate::core::syntax::{SyntaxChecker, SyntaxFault};

/// code 规则命中时的固定证据
pub const CODE_MATCH_EVIDENCE: &str = "代码中的模式匹配";

/// 修复后才发现的结论在诊断文本后追加此标记
pub const POST_FIX_TAG: &str = "(post-fix)";

/// 推理引擎
pub struct InferenceEngine<'a> {
    /// 知识库（只读）
    kb: &'a KnowledgeBase,
    checker: &'a dyn SyntaxChecker,
    evaluator: &'a dyn Evaluator,
}

/// 第2轮的解析结果
enum ParseOutcome {
    Parsed,
    Fault(SyntaxFault),
    /// 检查器不可用，后续依赖解析结果的推理全部跳过
    Unavailable,
}

impl<'a> InferenceEngine<'a> {
    /// 创建新的推理引擎
    pub fn new(
        kb: &'a KnowledgeBase,
        checker: &'a dyn SyntaxChecker,
        evaluator: &'a dyn Evaluator,
    ) -> Self {
        Self {
            kb,
            checker,
            evaluator,
        }
    }

    /// 执行推理
    ///
    /// 空结果表示"没有发现问题"，不是错误。
    pub fn infer(
        &self,
        code: &str,
        error_message: Option<&str>,
        allow_runtime_pass: bool,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        let has_code = !code.trim().is_empty();

        // 1) 外部错误消息
        if let Some(message) = error_message.map(str::trim).filter(|m| !m.is_empty()) {
            self.match_message(message, message, &mut findings);
        }

        // 2) 解析源码，解析器的故障消息同样交给 message 规则
        let parse = if has_code {
            self.parse(code)
        } else {
            ParseOutcome::Unavailable
        };
        if let ParseOutcome::Fault(fault) = &parse {
            self.match_message(&fault.message, &fault.message, &mut findings);
        }

        // 3) 源码文本上的静态模式
        if has_code {
            for rule in self.kb.rules_of_kind(RuleKind::Code) {
                if rule.pattern.matches(code) {
                    if let Some(et) = self.kb.error_type(rule.conclusion_id) {
                        findings.push(Finding::new(rule, et, CODE_MATCH_EVIDENCE));
                    }
                }
            }
        }

        // 4) 渐进修复 + 运行时
        if allow_runtime_pass && has_code {
            self.runtime_pass(code, &parse, &mut findings);
        }

        let findings = finalize_findings(findings);
        tracing::debug!("推理完成, findings={}", findings.len());
        findings
    }

    fn parse(&self, code: &str) -> ParseOutcome {
        match self.checker.check(code) {
            Ok(None) => ParseOutcome::Parsed,
            Ok(Some(fault)) => {
                tracing::debug!("解析器报告语法错误: {}", fault.message);
                ParseOutcome::Fault(fault)
            }
            Err(e) => {
                tracing::warn!("语法检查不可用: {}", e);
                ParseOutcome::Unavailable
            }
        }
    }

    fn runtime_pass(&self, code: &str, parse: &ParseOutcome, findings: &mut Vec<Finding>) {
        let missing_terminator = matches!(parse, ParseOutcome::Fault(f) if f.is_missing_terminator());

        // 能解析则直接执行原始代码
        if matches!(parse, ParseOutcome::Parsed) {
            if let Some(fault) = self.evaluate(code) {
                self.match_message(&fault, &fault, findings);
            }
        }

        if !missing_terminator {
            return;
        }

        let fixed = repair::repair(code);
        match self.checker.check(&fixed) {
            Ok(None) => {
                if let Some(fault) = self.evaluate(&fixed) {
                    let mut discovered = Vec::new();
                    self.match_message(&fault, &fault, &mut discovered);
                    for mut finding in discovered {
                        finding.diagnosis = format!("{} {}", finding.diagnosis, POST_FIX_TAG);
                        findings.push(finding);
                    }
                }
            }
            Ok(Some(fault)) => {
                tracing::debug!("修复后仍无法解析: {}", fault.message);
            }
            Err(e) => {
                tracing::warn!("语法检查不可用: {}", e);
            }
        }
    }

    fn evaluate(&self, code: &str) -> Option<String> {
        match self.evaluator.evaluate(code) {
            Ok(fault) => fault,
            Err(e) => {
                tracing::warn!("运行时求值不可用: {}", e);
                None
            }
        }
    }

    /// 用所有 message 规则匹配一段故障文本
    fn match_message(&self, text: &str, evidence: &str, findings: &mut Vec<Finding>) {
        for rule in self.kb.rules_of_kind(RuleKind::Message) {
            if rule.pattern.matches(text) {
                if let Some(et) = self.kb.error_type(rule.conclusion_id) {
                    findings.push(Finding::new(rule, et, evidence));
                }
            }
        }
    }
}
