//! PyExpert 命令行入口
//!
//! 读取源码和/或错误消息，加载知识库，执行推理并输出诊断报告。

use anyhow::{Context, Result};
use clap::Parser;
use pyexpert::core::models::{AppConfig, KbSnapshot};
use pyexpert::core::python::PythonInterpreter;
use pyexpert::core::rule_engine::InferenceEngine;
use pyexpert::storage::config::ConfigManager;
use pyexpert::storage::database::Database;
use pyexpert::ui::report;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "pyexpert",
    version,
    about = "Python 错误诊断（教学用）"
)]
struct Cli {
    /// 要分析的 .py 文件（省略时从管道读取）
    file: Option<PathBuf>,

    /// 解释器给出的错误消息
    #[arg(short = 'e', long = "error")]
    error: Option<String>,

    /// 输出调试信息
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 禁用运行时探测（不执行代码）
    #[arg(long, default_value_t = false)]
    no_runtime: bool,

    /// 以 JSON 输出诊断结果
    #[arg(long, default_value_t = false)]
    json: bool,

    /// 知识库数据库路径
    #[arg(long, env = "PYEXPERT_DB")]
    db: Option<PathBuf>,

    /// Python 解释器
    #[arg(long, env = "PYEXPERT_PYTHON")]
    python: Option<String>,

    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 写入配置文件（合并命令行中的 --db/--python）后退出
    #[arg(long, default_value_t = false, conflicts_with_all = ["file", "error", "export_kb", "import_kb"])]
    init_config: bool,

    /// 以 JSON 导出知识库后退出
    #[arg(long, default_value_t = false, conflicts_with_all = ["file", "error", "import_kb"])]
    export_kb: bool,

    /// 从 JSON 文件导入知识库后退出
    #[arg(long, value_name = "FILE", conflicts_with_all = ["file", "error"])]
    import_kb: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("pyexpert=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// 打开知识库，空库按配置写入内置规则
fn open_database(path: &Path, config: &AppConfig) -> Result<Database> {
    let mut db = Database::open(path)
        .with_context(|| format!("无法打开知识库: {}", path.display()))?;

    if config.seed_builtin && db.is_empty()? {
        db.seed_builtin()?;
    }
    Ok(db)
}

/// 读取源码：文件优先，其次是非终端的 stdin，否则为空
fn read_code(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("无法读取文件: {}", path.display()));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut code = String::new();
    stdin.read_to_string(&mut code).context("无法读取标准输入")?;
    Ok(code)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config_path = cli.config.clone().unwrap_or_else(ConfigManager::default_path);
    let manager = ConfigManager::new(config_path.clone());
    let mut config = manager.load()?;

    if cli.init_config {
        if let Some(db) = &cli.db {
            config.database_path = Some(db.clone());
        }
        if let Some(python) = &cli.python {
            config.python_program = python.clone();
        }
        manager
            .save(&config)
            .with_context(|| format!("无法写入配置: {}", config_path.display()))?;
        println!("已写入配置: {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }
    let db_path = cli
        .db
        .clone()
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(ConfigManager::default_database_path);

    if cli.export_kb {
        let db = open_database(&db_path, &config)?;
        println!("{}", serde_json::to_string_pretty(&db.export_snapshot()?)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = &cli.import_kb {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取文件: {}", path.display()))?;
        let snapshot: KbSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("知识库格式错误: {}", path.display()))?;

        let mut db = open_database(&db_path, &config)?;
        let (error_types, rules) = db.import_snapshot(&snapshot)?;
        println!("已导入 {} 个错误类型, {} 条规则", error_types, rules);
        return Ok(ExitCode::SUCCESS);
    }

    let code = read_code(cli.file.as_deref())?;
    let message = cli.error.as_deref().map(str::trim).unwrap_or_default();

    if code.is_empty() && message.is_empty() {
        eprintln!("{}", report::USAGE_HINT);
        return Ok(ExitCode::from(1));
    }

    let db = open_database(&db_path, &config)?;
    let kb = db.load_knowledge_base()?;

    let python = PythonInterpreter::new(cli.python.unwrap_or(config.python_program));
    let engine = InferenceEngine::new(&kb, &python, &python);
    let findings = engine.infer(
        &code,
        Some(message).filter(|m| !m.is_empty()),
        config.runtime_enabled && !cli.no_runtime,
    );

    if cli.json {
        println!("{}", report::render_json(&findings)?);
    } else {
        print!("{}", report::render_text(&findings));
    }
    Ok(ExitCode::SUCCESS)
}
