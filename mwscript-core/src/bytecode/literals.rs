//! 字面量池
//!
//! 整数、浮点数、字符串各一张表，编译期去重：同一个字面量在一个脚本中只占一个索引。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 编译完成后的只读字面量表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Literals {
    pub integers: Vec<i32>,
    pub floats: Vec<f32>,
    pub strings: Vec<String>,
}

impl Literals {
    pub fn integer(&self, index: u32) -> Option<i32> {
        self.integers.get(index as usize).copied()
    }

    pub fn float(&self, index: u32) -> Option<f32> {
        self.floats.get(index as usize).copied()
    }

    pub fn string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.integers.is_empty() && self.floats.is_empty() && self.strings.is_empty()
    }
}

/// 编译期使用的去重构建器
#[derive(Debug, Default)]
pub struct LiteralPool {
    literals: Literals,
    integer_index: HashMap<i32, u32>,
    /// 以位模式为键，`0.0` 与 `-0.0` 各占一项
    float_index: HashMap<u32, u32>,
    string_index: HashMap<String, u32>,
}

impl LiteralPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_integer(&mut self, value: i32) -> u32 {
        let literals = &mut self.literals;
        *self.integer_index.entry(value).or_insert_with(|| {
            literals.integers.push(value);
            (literals.integers.len() - 1) as u32
        })
    }

    pub fn add_float(&mut self, value: f32) -> u32 {
        let literals = &mut self.literals;
        *self.float_index.entry(value.to_bits()).or_insert_with(|| {
            literals.floats.push(value);
            (literals.floats.len() - 1) as u32
        })
    }

    pub fn add_string(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.string_index.get(value) {
            return index;
        }
        let index = self.literals.strings.len() as u32;
        self.literals.strings.push(value.to_string());
        self.string_index.insert(value.to_string(), index);
        index
    }

    pub fn finish(self) -> Literals {
        self.literals
    }
}
