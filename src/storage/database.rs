//! 数据库存储模块
//!
//! 使用SQLite存储知识库（错误类型和规则）

use crate::core::error::RuleError;
use crate::core::models::{ErrorType, KbSnapshot, KnowledgeBase, Rule, RuleDefinition, RuleKind};
use crate::storage::builtin;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// 数据库管理器
pub struct Database {
    conn: Connection,
}

impl Database {
    /// 打开或创建数据库
    pub fn open(path: &Path) -> Result<Self> {
        // 确保目录存在
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_tables()?;
        Ok(db)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_tables()?;
        Ok(db)
    }

    /// 初始化表结构
    fn init_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- 错误类型表
            CREATE TABLE IF NOT EXISTS error_type (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                severity INTEGER NOT NULL DEFAULT 1,
                explanation TEXT NOT NULL DEFAULT '',
                suggestion TEXT NOT NULL DEFAULT ''
            );

            -- 规则表
            CREATE TABLE IF NOT EXISTS rule (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                pattern_regex TEXT NOT NULL,
                conclusion_error_type_id INTEGER NOT NULL,
                diag_text TEXT NOT NULL DEFAULT '',
                priority INTEGER NOT NULL DEFAULT 100
            );

            -- 创建索引
            CREATE INDEX IF NOT EXISTS idx_rule_priority ON rule(priority ASC, id ASC);
            "#,
        )?;
        Ok(())
    }

    /// 知识库是否为空
    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM error_type) + (SELECT COUNT(*) FROM rule)",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// 写入内置知识库
    pub fn seed_builtin(&mut self) -> Result<()> {
        let snapshot = builtin::knowledge_base();
        let tx = self.conn.transaction()?;
        for et in &snapshot.error_types {
            Self::upsert_error_type(&tx, et)?;
        }
        for rule in &snapshot.rules {
            Self::upsert_rule(&tx, rule)?;
        }
        tx.commit()?;

        tracing::info!(
            "已写入内置知识库: {} 个错误类型, {} 条规则",
            snapshot.error_types.len(),
            snapshot.rules.len()
        );
        Ok(())
    }

    /// 保存错误类型
    pub fn save_error_type(&self, et: &ErrorType) -> Result<()> {
        Self::upsert_error_type(&self.conn, et)
    }

    /// 保存规则
    pub fn save_rule(&self, rule: &RuleDefinition) -> Result<()> {
        Self::upsert_rule(&self.conn, rule)
    }

    fn upsert_error_type(conn: &Connection, et: &ErrorType) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO error_type
            (id, name, category, severity, explanation, suggestion)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                et.id,
                et.name,
                et.category,
                et.severity,
                et.explanation,
                et.suggestion,
            ],
        )?;
        Ok(())
    }

    fn upsert_rule(conn: &Connection, rule: &RuleDefinition) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO rule
            (id, name, kind, pattern_regex, conclusion_error_type_id, diag_text, priority)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                rule.id,
                rule.name,
                rule.kind.as_str(),
                rule.pattern_regex,
                rule.conclusion_error_type_id,
                rule.diag_text,
                rule.priority,
            ],
        )?;
        Ok(())
    }

    /// 删除规则
    pub fn delete_rule(&self, rule_id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM rule WHERE id = ?1", params![rule_id])?;
        Ok(affected > 0)
    }

    /// 加载所有错误类型
    pub fn load_error_types(&self) -> Result<Vec<ErrorType>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, severity, explanation, suggestion FROM error_type ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ErrorType {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                severity: row.get(3)?,
                explanation: row.get(4)?,
                suggestion: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 加载规则定义（按优先级、ID 升序）
    ///
    /// 类型未知的规则被跳过并记录警告。
    pub fn load_rule_definitions(&self) -> Result<Vec<RuleDefinition>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, kind, pattern_regex, conclusion_error_type_id, diag_text, priority
            FROM rule
            ORDER BY priority ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(2)?;
            Ok((
                kind,
                RuleDefinition {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind: RuleKind::Message,
                    pattern_regex: row.get(3)?,
                    conclusion_error_type_id: row.get(4)?,
                    diag_text: row.get(5)?,
                    priority: row.get(6)?,
                },
            ))
        })?;

        let mut definitions = Vec::new();
        for row in rows {
            let (kind, mut def) = row?;
            match kind.parse::<RuleKind>() {
                Ok(kind) => {
                    def.kind = kind;
                    definitions.push(def);
                }
                Err(kind) => {
                    let err = RuleError::UnknownKind {
                        rule: def.name,
                        kind,
                    };
                    tracing::warn!("跳过规则: {}", err);
                }
            }
        }
        Ok(definitions)
    }

    /// 加载并编译知识库
    pub fn load_knowledge_base(&self) -> Result<KnowledgeBase> {
        let error_types = self.load_error_types()?;
        let definitions = self.load_rule_definitions()?;
        let kb = KnowledgeBase::new(error_types, definitions);

        tracing::debug!(
            "已加载 {} 个错误类型和 {} 条规则",
            kb.error_type_count(),
            kb.rule_count()
        );
        for rule in kb.rules() {
            tracing::debug!(
                "规则 {} {} [{}] / {}",
                rule.id,
                rule.name,
                rule.kind,
                rule.pattern.as_str()
            );
        }
        Ok(kb)
    }

    /// 导出知识库快照
    pub fn export_snapshot(&self) -> Result<KbSnapshot> {
        Ok(KbSnapshot {
            error_types: self.load_error_types()?,
            rules: self.load_rule_definitions()?,
        })
    }

    /// 导入知识库快照
    ///
    /// 模式无法编译的规则不写入，返回 (错误类型数, 规则数)。
    pub fn import_snapshot(&mut self, snapshot: &KbSnapshot) -> Result<(usize, usize)> {
        let tx = self.conn.transaction()?;

        for et in &snapshot.error_types {
            Self::upsert_error_type(&tx, et)?;
        }

        let mut imported = 0;
        for def in &snapshot.rules {
            if let Err(err) = Rule::compile(def.clone()) {
                tracing::warn!("跳过规则: {}", err);
                continue;
            }
            Self::upsert_rule(&tx, def)?;
            imported += 1;
        }

        tx.commit()?;
        Ok((snapshot.error_types.len(), imported))
    }
}
