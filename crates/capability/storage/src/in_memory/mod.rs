//! 内存存储实现模块
//!
//! 仅用于测试。

pub mod measurement;

pub use measurement::*;
