//! 输出模块 - 诊断结果的呈现

pub mod report;
