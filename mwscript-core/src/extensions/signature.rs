//! 扩展参数签名
//!
//! 沿用旧式单字母写法：`l`/`s` 整数，`f` 浮点，`c` 名字（转小写），
//! `S` 文本（保留大小写），`x` 忽略的参数；`/` 之后的参数都是可选的。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    Integer,
    Float,
    /// 名字参数，编译期转为小写字符串字面量
    Name,
    /// 文本参数，原样作为字符串字面量
    Text,
    /// 解析后丢弃，不压栈
    Ignored,
}

impl ArgKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ArgKind::Integer | ArgKind::Float)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("unknown argument code '{0}' in signature")]
    UnknownCode(char),
    #[error("signature has more than one '/' separator")]
    RepeatedSeparator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    text: String,
    args: Vec<ArgKind>,
    required: usize,
}

impl Signature {
    pub fn parse(text: &str) -> Result<Signature, SignatureError> {
        let mut args = Vec::with_capacity(text.len());
        let mut required = None;
        for c in text.chars() {
            let kind = match c {
                '/' => {
                    if required.replace(args.len()).is_some() {
                        return Err(SignatureError::RepeatedSeparator);
                    }
                    continue;
                }
                'l' | 's' => ArgKind::Integer,
                'f' => ArgKind::Float,
                'c' => ArgKind::Name,
                'S' => ArgKind::Text,
                'x' => ArgKind::Ignored,
                other => return Err(SignatureError::UnknownCode(other)),
            };
            args.push(kind);
        }
        let required = required.unwrap_or(args.len());
        Ok(Signature {
            text: text.to_string(),
            args,
            required,
        })
    }

    pub fn args(&self) -> &[ArgKind] {
        &self.args
    }

    /// 必需参数个数
    pub fn required(&self) -> usize {
        self.required
    }

    pub fn has_optional(&self) -> bool {
        self.required < self.args.len()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_required_and_optional() {
        let sig = Signature::parse("Sc/fl").unwrap();
        assert_eq!(
            sig.args(),
            &[ArgKind::Text, ArgKind::Name, ArgKind::Float, ArgKind::Integer]
        );
        assert_eq!(sig.required(), 2);
        assert!(sig.has_optional());
        assert_eq!(sig.to_string(), "Sc/fl");
    }

    #[test]
    fn test_empty_signature() {
        let sig = Signature::parse("").unwrap();
        assert!(sig.args().is_empty());
        assert!(!sig.has_optional());
    }

    #[test]
    fn test_bad_signatures() {
        assert_eq!(Signature::parse("fq"), Err(SignatureError::UnknownCode('q')));
        assert_eq!(
            Signature::parse("f/l/l"),
            Err(SignatureError::RepeatedSeparator)
        );
    }
}
