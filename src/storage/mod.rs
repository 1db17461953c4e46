//! 存储模块 - 知识库与配置

pub mod builtin;
pub mod config;
pub mod database;
