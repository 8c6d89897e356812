//! Lexer 错误类型
//!
//! 词法错误只记录、不中断：扫描器报告后从下一个字符继续。

use super::core::SourceSpan;

/// 错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexErrorKind {
    /// 非法字符
    #[error("invalid character {0:?}")]
    InvalidChar(char),
    /// 未终止的字符串（字符串不能跨行）
    #[error("unterminated string literal")]
    UnterminatedString,
    /// 数字格式错误
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),
}

/// 词法错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {}:{}", span.start.line, span.start.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: SourceSpan,
    /// 出错位置的原文
    pub text: String,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// 获取行号（1-based）
    pub fn line(&self) -> usize {
        self.span.start.line
    }

    /// 获取列号（1-based）
    pub fn column(&self) -> usize {
        self.span.start.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::lexer::core::SourcePosition;

    #[test]
    fn test_error_display() {
        let pos = SourcePosition::new(3, 7, 20);
        let err = LexError::new(
            LexErrorKind::InvalidNumber("12abc".into()),
            SourceSpan::at(pos),
            "12abc",
        );
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
        assert_eq!(err.to_string(), "invalid numeric literal '12abc' at 3:7");
    }
}
