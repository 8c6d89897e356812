//! mwscript Token 类型定义

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TokenKind {
    // 关键字
    Begin = 0,
    End,
    Short,
    Long,
    Float,
    Set,
    To,
    If,
    Elseif,
    Else,
    Endif,
    While,
    Endwhile,
    Return,

    // 字面量
    LiteralInteger = 100,
    LiteralFloat,
    LiteralString,

    // 标识符
    Identifier = 120,

    // 比较运算符（<> << 已折叠为 <，>< >> 已折叠为 >）
    DoubleEqual = 130,
    ExclamationEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // 单字符符号
    Plus = 150,
    Minus,
    Asterisk,
    Slash,
    LeftParenthesis,
    RightParenthesis,
    Comma,
    /// `->` 显式引用 / 成员访问
    Arrow,
    /// 历史脚本中出现的杂散标点（`:` `!` `?` ...），仅用于容错
    Punctuation,

    // 结构
    NewLine = 200,
    #[default]
    Eof,
}

/// 关键字表（小写匹配）
pub(crate) static KEYWORD_TABLE: [(&str, TokenKind); 14] = [
    ("begin", TokenKind::Begin),
    ("end", TokenKind::End),
    ("short", TokenKind::Short),
    ("long", TokenKind::Long),
    ("float", TokenKind::Float),
    ("set", TokenKind::Set),
    ("to", TokenKind::To),
    ("if", TokenKind::If),
    ("elseif", TokenKind::Elseif),
    ("else", TokenKind::Else),
    ("endif", TokenKind::Endif),
    ("while", TokenKind::While),
    ("endwhile", TokenKind::Endwhile),
    ("return", TokenKind::Return),
];

impl TokenKind {
    /// 按小写单词查找关键字
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORD_TABLE
            .iter()
            .find(|(kw, _)| word.eq_ignore_ascii_case(kw))
            .map(|(_, kind)| *kind)
    }

    pub fn is_keyword(self) -> bool {
        (self as u8) < 100
    }

    /// 标识符或关键字：可出现在名字位置（`Begin Begin`、`StopScript Begin`）
    pub fn is_word(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::DoubleEqual
                | TokenKind::ExclamationEqual
                | TokenKind::LessThan
                | TokenKind::LessThanEqual
                | TokenKind::GreaterThan
                | TokenKind::GreaterThanEqual
        )
    }

    /// 语句结束（行尾或文件尾）
    pub fn ends_line(self) -> bool {
        matches!(self, TokenKind::NewLine | TokenKind::Eof)
    }

    /// 此 token 之后是否期望一个操作数（决定 `-1` 是字面量还是减号）
    pub fn expects_operand_after(self) -> bool {
        !matches!(
            self,
            TokenKind::Identifier
                | TokenKind::LiteralInteger
                | TokenKind::LiteralFloat
                | TokenKind::LiteralString
                | TokenKind::RightParenthesis
        )
    }

    /// 用于诊断信息的名称
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Begin => "'begin'",
            TokenKind::End => "'end'",
            TokenKind::Short => "'short'",
            TokenKind::Long => "'long'",
            TokenKind::Float => "'float'",
            TokenKind::Set => "'set'",
            TokenKind::To => "'to'",
            TokenKind::If => "'if'",
            TokenKind::Elseif => "'elseif'",
            TokenKind::Else => "'else'",
            TokenKind::Endif => "'endif'",
            TokenKind::While => "'while'",
            TokenKind::Endwhile => "'endwhile'",
            TokenKind::Return => "'return'",
            TokenKind::LiteralInteger => "integer literal",
            TokenKind::LiteralFloat => "float literal",
            TokenKind::LiteralString => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::DoubleEqual => "'=='",
            TokenKind::ExclamationEqual => "'!='",
            TokenKind::LessThan => "'<'",
            TokenKind::LessThanEqual => "'<='",
            TokenKind::GreaterThan => "'>'",
            TokenKind::GreaterThanEqual => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::LeftParenthesis => "'('",
            TokenKind::RightParenthesis => "')'",
            TokenKind::Comma => "','",
            TokenKind::Arrow => "'->'",
            TokenKind::Punctuation => "punctuation",
            TokenKind::NewLine => "end of line",
            TokenKind::Eof => "end of file",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(TokenKind::keyword("BEGIN"), Some(TokenKind::Begin));
        assert_eq!(TokenKind::keyword("EndWhile"), Some(TokenKind::Endwhile));
        assert_eq!(TokenKind::keyword("player"), None);
    }

    #[test]
    fn test_classification() {
        assert!(TokenKind::Return.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(TokenKind::End.is_word());
        assert!(TokenKind::LessThanEqual.is_comparison());
        assert!(TokenKind::Eof.ends_line());
        assert!(TokenKind::To.expects_operand_after());
        assert!(!TokenKind::RightParenthesis.expects_operand_after());
    }
}
