//! 配置文件管理模块

use crate::core::models::AppConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// 配置管理器
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "pyexpert", "PyExpert")
    }

    /// 获取默认配置路径
    pub fn default_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// 获取默认知识库路径
    pub fn default_database_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("knowledge.db"))
            .unwrap_or_else(|| PathBuf::from("knowledge.db"))
    }

    /// 加载配置
    pub fn load(&self) -> Result<AppConfig> {
        if self.config_path.exists() {
            let content = std::fs::read_to_string(&self.config_path)
                .with_context(|| format!("读取配置失败: {}", self.config_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("配置格式错误: {}", self.config_path.display()))
        } else {
            Ok(AppConfig::default())
        }
    }

    /// 保存配置
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        let manager = ConfigManager::new(config_path);

        let mut config = AppConfig::default();
        config.python_program = "python3.12".to_string();
        config.runtime_enabled = false;

        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.python_program, "python3.12");
        assert!(!loaded.runtime_enabled);
    }

    #[test]
    fn test_missing_file_and_partial_config() {
        let dir = tempdir().unwrap();

        let missing = ConfigManager::new(dir.path().join("none.json"));
        let config = missing.load().unwrap();
        assert_eq!(config.python_program, "python3");
        assert!(config.runtime_enabled);

        let partial_path = dir.path().join("partial.json");
        std::fs::write(&partial_path, r#"{ "database_path": "/tmp/kb.db" }"#).unwrap();
        let config = ConfigManager::new(partial_path).load().unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/kb.db")));
        assert!(config.seed_builtin);
    }
}
