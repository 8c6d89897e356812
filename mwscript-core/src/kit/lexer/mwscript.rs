//! mwscript 语言 Scanner 实现
//!
//! - 关键字、标识符（大小写无关，允许非 ASCII 字符）
//! - 运算符，含历史别名：`<>` `<<` 视为 `<`，`><` `>>` 视为 `>`
//! - 数字（可带符号、小数点、指数）、双引号字符串（无转义）
//! - `;` 注释到行尾；换行是 token（语句按行划分）

use super::core::{CharStream, SourceSpan};
use super::error::{LexError, LexErrorKind};
use super::scanner::{
    is_identifier_continue, is_identifier_start, is_stray_punctuation, ScanResult, Token,
    TokenValue,
};
use super::core::SourcePosition;
use crate::compiler::lexer::TokenKind;

use tracing::trace;

/// mwscript 扫描器
pub struct MwScanner {
    /// 当前 token 的起始位置（用于构建 span）
    token_start: SourcePosition,
    /// 上一个 token 之后是否期望操作数；决定 `-1` 是带符号字面量还是减号
    operand_expected: bool,
}

impl Default for MwScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MwScanner {
    pub fn new() -> Self {
        Self {
            token_start: SourcePosition::start(),
            operand_expected: true,
        }
    }

    /// 扫描下一个 token
    pub fn next_token(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        let result = self.scan(stream);
        match &result {
            ScanResult::Token(token) => {
                trace!(
                    target: "mwscript::lexer",
                    kind = ?token.kind,
                    line = token.span.start.line,
                    column = token.span.start.column,
                    "Scanned token"
                );
                self.operand_expected = token.kind.expects_operand_after();
            }
            ScanResult::Error(err) => {
                trace!(target: "mwscript::lexer", error = %err, "Scan error");
            }
            ScanResult::Eof => {}
        }
        result
    }

    fn scan(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        self.skip_whitespace_and_comments(stream);
        self.token_start = stream.position();

        let c = match stream.peek(0) {
            Some(c) => c,
            None => return ScanResult::Eof,
        };

        match c {
            '\n' => self.make_single_char(stream, TokenKind::NewLine),
            '+' | '-' if self.operand_expected && starts_number(stream, 1) => {
                self.scan_number(stream)
            }
            '+' => self.make_single_char(stream, TokenKind::Plus),
            '-' => self.scan_minus(stream),
            '*' => self.make_single_char(stream, TokenKind::Asterisk),
            '/' => self.make_single_char(stream, TokenKind::Slash),
            '(' => self.make_single_char(stream, TokenKind::LeftParenthesis),
            ')' => self.make_single_char(stream, TokenKind::RightParenthesis),
            ',' => self.make_single_char(stream, TokenKind::Comma),

            '=' => self.scan_eq(stream),
            '!' => self.scan_bang(stream),
            '<' => self.scan_lt(stream),
            '>' => self.scan_gt(stream),

            '"' => self.scan_string(stream),

            '.' if starts_number(stream, 0) => self.scan_number(stream),
            '0'..='9' => self.scan_number(stream),

            c if is_identifier_start(c) => self.scan_word(stream),
            c if is_stray_punctuation(c) => self.make_single_char(stream, TokenKind::Punctuation),

            _ => {
                stream.advance();
                self.error(stream, LexErrorKind::InvalidChar(c))
            }
        }
    }

    fn make_token(&self, stream: &CharStream<'_>, kind: TokenKind) -> ScanResult {
        let span = SourceSpan::range(self.token_start, stream.position());
        ScanResult::Token(Token::new(kind, span, stream.slice_from(self.token_start)))
    }

    fn make_single_char(&mut self, stream: &mut CharStream<'_>, kind: TokenKind) -> ScanResult {
        stream.advance();
        self.make_token(stream, kind)
    }

    fn error(&self, stream: &CharStream<'_>, kind: LexErrorKind) -> ScanResult {
        let span = SourceSpan::range(self.token_start, stream.position());
        ScanResult::Error(LexError::new(kind, span, stream.slice_from(self.token_start)))
    }

    /// 扫描 '=' 系列（==）
    fn scan_eq(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance();
        if stream.eat('=') {
            self.make_token(stream, TokenKind::DoubleEqual)
        } else {
            // 单独的 '=' 不是运算符
            self.make_token(stream, TokenKind::Punctuation)
        }
    }

    /// 扫描 '!' 系列（!=）
    fn scan_bang(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance();
        if stream.eat('=') {
            self.make_token(stream, TokenKind::ExclamationEqual)
        } else {
            self.make_token(stream, TokenKind::Punctuation)
        }
    }

    /// 扫描 '<' 系列（<, <=, 以及别名 <> <<）
    fn scan_lt(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance();
        if stream.eat('=') {
            return self.make_token(stream, TokenKind::LessThanEqual);
        }
        if !stream.eat('>') {
            stream.eat('<');
        }
        self.make_token(stream, TokenKind::LessThan)
    }

    /// 扫描 '>' 系列（>, >=, 以及别名 >< >>）
    fn scan_gt(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance();
        if stream.eat('=') {
            return self.make_token(stream, TokenKind::GreaterThanEqual);
        }
        if !stream.eat('<') {
            stream.eat('>');
        }
        self.make_token(stream, TokenKind::GreaterThan)
    }

    /// 扫描 '-' 系列（-, ->）
    fn scan_minus(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance();
        if stream.eat('>') {
            self.make_token(stream, TokenKind::Arrow)
        } else {
            self.make_token(stream, TokenKind::Minus)
        }
    }

    /// 跳过空白符（换行除外）和注释
    fn skip_whitespace_and_comments(&mut self, stream: &mut CharStream<'_>) {
        loop {
            match stream.peek(0) {
                Some(c) if c.is_whitespace() && c != '\n' => {
                    stream.advance();
                }
                Some(';') => stream.advance_while(|c| c != '\n'),
                _ => break,
            }
        }
    }

    /// 扫描字符串；不处理转义，不能跨行
    fn scan_string(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance(); // 开头引号
        let content_start = stream.position();
        stream.advance_while(|c| c != '"' && c != '\n');

        if stream.check('"') {
            let content = stream.slice_from(content_start);
            stream.advance(); // 结尾引号
            let span = SourceSpan::range(self.token_start, stream.position());
            ScanResult::Token(Token::new(TokenKind::LiteralString, span, content))
        } else {
            // 换行留给下一个 token
            self.error(stream, LexErrorKind::UnterminatedString)
        }
    }

    /// 扫描数字（整数或浮点数），可带前导符号
    fn scan_number(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        if matches!(stream.peek(0), Some('+' | '-')) {
            stream.advance();
        }
        stream.advance_while(|c| c.is_ascii_digit());

        let mut is_float = false;
        if stream.eat('.') {
            is_float = true;
            stream.advance_while(|c| c.is_ascii_digit());
        }

        if matches!(stream.peek(0), Some('e' | 'E')) {
            let digits_at = if matches!(stream.peek(1), Some('+' | '-')) { 2 } else { 1 };
            if stream.peek(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    stream.advance();
                }
                stream.advance_while(|c| c.is_ascii_digit());
                is_float = true;
            }
        }

        // 数字后紧跟字母或小数点：整体视为非法数字并跳过
        if stream
            .peek(0)
            .is_some_and(|c| is_identifier_continue(c) || c == '.')
        {
            stream.advance_while(|c| is_identifier_continue(c) || c == '.');
            let text = stream.slice_from(self.token_start).to_string();
            return self.error(stream, LexErrorKind::InvalidNumber(text));
        }

        let text = stream.slice_from(self.token_start);
        let parsed = if is_float {
            text.parse::<f32>()
                .ok()
                .map(|v| (TokenKind::LiteralFloat, TokenValue::Float(v)))
        } else {
            text.parse::<i32>()
                .ok()
                .map(|v| (TokenKind::LiteralInteger, TokenValue::Integer(v)))
        };

        match parsed {
            Some((kind, value)) => {
                let span = SourceSpan::range(self.token_start, stream.position());
                ScanResult::Token(Token::new(kind, span, text).with_value(value))
            }
            None => self.error(stream, LexErrorKind::InvalidNumber(text.to_string())),
        }
    }

    /// 扫描标识符或关键字
    fn scan_word(&mut self, stream: &mut CharStream<'_>) -> ScanResult {
        stream.advance_while(is_identifier_continue);
        let text = stream.slice_from(self.token_start);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(stream, kind)
    }
}

/// 从偏移 n 开始是否是数字（`5` 或 `.5`）
fn starts_number(stream: &CharStream<'_>, n: usize) -> bool {
    match stream.peek(n) {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => stream.peek(n + 1).is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}
