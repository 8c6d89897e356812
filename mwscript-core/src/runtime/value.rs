//! 运行时栈上的值

use serde::{Deserialize, Serialize};

use crate::types::ValueType;

/// 带标签的栈值；字符串参数以字面量索引的整数形式出现
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Data {
    Integer(i32),
    Float(f32),
}

impl Data {
    /// 浮点向零截断（溢出时饱和）
    pub fn as_integer(self) -> i32 {
        match self {
            Data::Integer(v) => v,
            Data::Float(v) => v as i32,
        }
    }

    pub fn as_float(self) -> f32 {
        match self {
            Data::Integer(v) => v as f32,
            Data::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Data::Integer(v) => v == 0,
            Data::Float(v) => v == 0.0,
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Data::Integer(_) => ValueType::Integer,
            Data::Float(_) => ValueType::Float,
        }
    }
}

impl From<i32> for Data {
    fn from(v: i32) -> Self {
        Data::Integer(v)
    }
}

impl From<i16> for Data {
    fn from(v: i16) -> Self {
        Data::Integer(v.into())
    }
}

impl From<f32> for Data {
    fn from(v: f32) -> Self {
        Data::Float(v)
    }
}

impl std::fmt::Display for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Data::Integer(v) => write!(f, "{v}"),
            Data::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_truncate_toward_zero() {
        assert_eq!(Data::Float(2.9).as_integer(), 2);
        assert_eq!(Data::Float(-2.9).as_integer(), -2);
        assert_eq!(Data::Integer(3).as_float(), 3.0);
    }

    #[test]
    fn test_is_zero() {
        assert!(Data::Integer(0).is_zero());
        assert!(Data::Float(-0.0).is_zero());
        assert!(!Data::Float(0.1).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Data::Integer(-4).to_string(), "-4");
        assert_eq!(Data::Float(1.0).to_string(), "1.0");
    }
}
