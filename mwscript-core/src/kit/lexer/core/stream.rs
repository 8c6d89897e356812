//! 字符流抽象
//!
//! 在一段完整源码上提供字符级预读、前进与位置追踪

use super::position::SourcePosition;

/// 字符流
pub struct CharStream<'a> {
    source: &'a str,
    position: SourcePosition,
}

impl<'a> CharStream<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: SourcePosition::start(),
        }
    }

    /// 预读第 n 个字符（不消费）
    pub fn peek(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// 检查下一个字符是否匹配
    pub fn check(&self, expected: char) -> bool {
        self.peek(0) == Some(expected)
    }

    /// 消费一个字符
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.position.advance(c);
        Some(c)
    }

    /// 若下一个字符匹配则消费
    pub fn eat(&mut self, expected: char) -> bool {
        if self.check(expected) {
            self.position.advance(expected);
            true
        } else {
            false
        }
    }

    /// 消费满足条件的连续字符
    pub fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            self.position.advance(c);
        }
    }

    pub fn position(&self) -> SourcePosition {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position.byte_offset >= self.source.len()
    }

    /// 取出 [from, 当前位置) 的原文
    pub fn slice_from(&self, from: SourcePosition) -> &'a str {
        &self.source[from.byte_offset..self.position.byte_offset]
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position.byte_offset..]
    }
}
