//! 变量与表达式类型

use serde::{Deserialize, Serialize};

/// 变量的存储类型（局部、全局、成员变量共用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    /// 16 位整数，写入时截断
    Short,
    /// 32 位整数
    Long,
    /// 32 位浮点数
    Float,
}

impl VarType {
    pub const ALL: [VarType; 3] = [VarType::Short, VarType::Long, VarType::Float];

    /// 旧式单字母类型码：`s` `l` `f`
    pub fn from_code(code: char) -> Option<VarType> {
        match code {
            's' => Some(VarType::Short),
            'l' => Some(VarType::Long),
            'f' => Some(VarType::Float),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            VarType::Short => 's',
            VarType::Long => 'l',
            VarType::Float => 'f',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Short => "short",
            VarType::Long => "long",
            VarType::Float => "float",
        }
    }

    /// 读取该类型变量得到的表达式类型
    pub fn value_type(self) -> ValueType {
        match self {
            VarType::Short | VarType::Long => ValueType::Integer,
            VarType::Float => ValueType::Float,
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// 表达式的静态类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
}

impl ValueType {
    /// 二元运算的结果类型：任一侧为浮点则提升为浮点
    pub fn promote(self, other: ValueType) -> ValueType {
        if self == ValueType::Float || other == ValueType::Float {
            ValueType::Float
        } else {
            ValueType::Integer
        }
    }
}
