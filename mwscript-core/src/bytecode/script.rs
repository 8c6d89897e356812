//! 已编译脚本
//!
//! 编译一次产生，之后只读；可被多个运行时上下文反复执行。

use serde::{Deserialize, Serialize};

use super::literals::Literals;
use super::locals::Locals;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledScript {
    name: String,
    code: Vec<u32>,
    locals: Locals,
    literals: Literals,
}

impl CompiledScript {
    pub fn new(name: impl Into<String>, code: Vec<u32>, locals: Locals, literals: Literals) -> Self {
        Self {
            name: name.into(),
            code,
            locals,
            literals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &[u32] {
        &self.code
    }

    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    pub fn literals(&self) -> &Literals {
        &self.literals
    }

    /// JSON 形式（调试与工具链交换用）
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
