//! PyExpert - 面向初学者的 Python 错误诊断专家系统
//!
//! 核心设计原则：
//! - 规则决定结论，知识库可随时扩充
//! - 解析失败和运行时异常都是证据，而不是错误
//! - 修复只为继续诊断，绝不改写用户文件
//! - 只执行可信的教学代码

pub mod core;
pub mod storage;
pub mod ui;
