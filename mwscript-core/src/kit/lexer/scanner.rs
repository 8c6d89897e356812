//! Token 与扫描结果定义

use super::core::{SourcePosition, SourceSpan};
use super::error::LexError;
use crate::compiler::lexer::TokenKind;

/// 数值字面量的值
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Integer(i32),
    Float(f32),
}

/// Token 结构
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
    /// 原始文本；字符串字面量为去掉引号后的内容
    pub text: String,
    pub value: TokenValue,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            value: TokenValue::None,
        }
    }

    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = value;
        self
    }

    pub fn eof(pos: SourcePosition) -> Self {
        Self::new(TokenKind::Eof, SourceSpan::at(pos), "")
    }

    /// 获取 token 的起始位置
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    /// 小写文本（名字比较一律大小写无关）
    pub fn lowercase(&self) -> String {
        self.text.to_lowercase()
    }
}

/// 扫描结果
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    /// 成功扫描到 token
    Token(Token),
    /// 流已结束
    Eof,
    /// 扫描错误（已跳过出错的字符）
    Error(LexError),
}

/// 标识符首字符（允许非 ASCII，如 `Jejubãr`）
pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii()
}

/// 标识符后续字符
pub fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || !c.is_ascii()
}

/// 历史脚本里可能出现的杂散标点
pub fn is_stray_punctuation(c: char) -> bool {
    matches!(
        c,
        ':' | '!' | '?' | '\'' | '&' | '|' | '#' | '@' | '$' | '%' | '^' | '[' | ']' | '{' | '}'
            | '~' | '\\' | '.' | '=' | '`'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_chars() {
        assert!(is_identifier_start('k'));
        assert!(is_identifier_start('_'));
        assert!(is_identifier_start('ã'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_continue('1'));
        assert!(!is_identifier_continue('-'));
    }

    #[test]
    fn test_token_lowercase() {
        let token = Token::new(TokenKind::Identifier, SourceSpan::default(), "GameHour");
        assert_eq!(token.lowercase(), "gamehour");
        assert_eq!(token.value, TokenValue::None);
    }
}
