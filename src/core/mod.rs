//! Core模块 - 包含所有核心业务逻辑

pub mod error;
pub mod evaluator;
pub mod models;
pub mod pattern;
pub mod python;
pub mod repair;
pub mod rule_engine;
pub mod syntax;

#[cfg(test)]
mod sim_integration_tests;
