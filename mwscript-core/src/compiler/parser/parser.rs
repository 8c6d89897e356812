//! 行导向的递归下降解析器
//!
//! 语句以换行结束。每一行是一个恢复单元：行内出错时记录诊断、
//! 跳到下一行继续，因此一次编译能报告多处错误。
//! 名字在解析时即完成查找（局部变量 → 全局变量 → 扩展），
//! 产出的语法树可直接交给代码生成。

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::error::{ParseResult, ParserError};
use super::expr::{BinaryOp, Call, CallArg, Expr, ExprKind, Target};
use super::stmt::{ScriptAst, Stmt, StmtKind};
use crate::bytecode::Locals;
use crate::compiler::context::CompilerContext;
use crate::compiler::diagnostics::{
    CompileError, Diagnostic, DiagnosticKind, ErrorHandler, Location, Severity,
};
use crate::compiler::lexer::TokenKind;
use crate::extensions::{ArgKind, Extension, Extensions};
use crate::kit::lexer::{Lexer, SourcePosition, Token, TokenValue};
use crate::types::VarType;

/// 参数解析所处的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgMode {
    /// 语句：数值参数是完整表达式
    Statement,
    /// 表达式内的函数调用：数值参数是单个操作数
    Expression,
}

pub struct Parser<'a> {
    tokens: Lexer<'a>,
    lookahead: VecDeque<Token>,
    current: Token,
    eof: Token,
    context: &'a dyn CompilerContext,
    extensions: &'a Extensions,
    errors: &'a mut ErrorHandler,
    locals: Locals,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        context: &'a dyn CompilerContext,
        extensions: &'a Extensions,
        errors: &'a mut ErrorHandler,
    ) -> Self {
        let eof = Token::eof(SourcePosition::start());
        let mut parser = Self {
            tokens: Lexer::new(source),
            lookahead: VecDeque::new(),
            current: eof.clone(),
            eof,
            context,
            extensions,
            errors,
            locals: Locals::new(),
        };
        parser.current = parser.fetch();
        parser
    }

    /// 解析整个脚本
    pub fn parse(mut self) -> Result<ScriptAst, CompileError> {
        self.skip_blank_lines();
        if !self.check(TokenKind::Begin) {
            let diagnostic = Diagnostic {
                severity: Severity::Error,
                kind: DiagnosticKind::MissingBegin,
                location: Some(self.location()),
            };
            self.errors
                .error(diagnostic.kind.clone(), diagnostic.location.clone());
            return Err(CompileError::Unrecoverable(diagnostic));
        }
        self.advance();
        self.eat(TokenKind::Comma);

        // 名字位置接受任意 token，包括关键字
        let name = if self.at_line_end() {
            let err = self.unexpected("script name");
            self.record(err);
            String::new()
        } else {
            self.advance().text
        };
        debug!(target: "mwscript::parser", %name, "Parsing script");
        self.end_line();

        let body = self.parse_block(&[]);

        if self.check(TokenKind::End) {
            self.advance();
            self.eat(TokenKind::Comma);
            // 结尾名字可省略，也不必与开头一致
            if !self.at_line_end() {
                self.advance();
            }
            self.end_line();
            self.skip_trailing();
        } else {
            let location = self.location();
            self.errors.error(DiagnosticKind::MissingEnd, Some(location));
        }

        Ok(ScriptAst {
            name,
            locals: self.locals,
            body,
        })
    }

    // ==================== token 游标 ====================

    /// 从词法器取下一个 token，词法错误记录后跳过
    fn fetch(&mut self) -> Token {
        loop {
            match self.tokens.next() {
                Some(Ok(token)) => {
                    trace!(target: "mwscript::lexer", kind = ?token.kind, text = %token.text, "Token");
                    if token.kind == TokenKind::Eof {
                        self.eof = token.clone();
                    }
                    return token;
                }
                Some(Err(err)) => {
                    let location = Location::new(err.span.start, err.text.clone());
                    self.errors.error(DiagnosticKind::Lexical(err.kind), Some(location));
                }
                None => return self.eof.clone(),
            }
        }
    }

    /// 消费当前 token 并返回它
    fn advance(&mut self) -> Token {
        let next = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.fetch(),
        };
        std::mem::replace(&mut self.current, next)
    }

    /// 当前 token 之后的那个 token
    fn peek(&mut self) -> TokenKind {
        if self.lookahead.is_empty() {
            let token = self.fetch();
            self.lookahead.push_back(token);
        }
        self.lookahead
            .front()
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn at_line_end(&self) -> bool {
        self.current.kind.ends_line()
    }

    fn location(&self) -> Location {
        Location::new(self.current.start(), self.current.text.clone())
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        ParserError::new(
            DiagnosticKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.kind.describe().to_string(),
            },
            self.location(),
        )
    }

    fn record(&mut self, err: ParserError) {
        self.errors.error(err.kind, Some(err.location));
    }

    fn warn_here(&mut self, kind: DiagnosticKind) {
        let location = self.location();
        self.errors.warning(kind, Some(location));
    }

    /// 跳过当前行剩余部分（包括换行）
    fn skip_line(&mut self) {
        while !self.at_line_end() {
            self.advance();
        }
        self.eat(TokenKind::NewLine);
    }

    /// 结束一行：多余的 token 以警告忽略
    fn end_line(&mut self) {
        if !self.at_line_end() {
            self.warn_here(DiagnosticKind::ExtraTokensIgnored);
        }
        self.skip_line();
    }

    fn skip_blank_lines(&mut self) {
        while self.eat(TokenKind::NewLine) {}
    }

    /// `End` 之后的内容全部忽略
    fn skip_trailing(&mut self) {
        self.skip_blank_lines();
        if !self.check(TokenKind::Eof) {
            self.warn_here(DiagnosticKind::ExtraTokensIgnored);
            while !self.check(TokenKind::Eof) {
                self.advance();
            }
        }
    }

    // ==================== 语句 ====================

    /// 解析语句直到遇到终止关键字、`End` 或文件末尾（均不消费）
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut body = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::NewLine => {
                    self.advance();
                }
                TokenKind::Eof | TokenKind::End => return body,
                kind if terminators.contains(&kind) => return body,
                TokenKind::Elseif | TokenKind::Else | TokenKind::Endif | TokenKind::Endwhile => {
                    let kind = DiagnosticKind::StrayBlockEnd(self.current.lowercase());
                    let location = self.location();
                    self.errors.error(kind, Some(location));
                    self.skip_line();
                }
                _ => {
                    if let Some(stmt) = self.parse_statement_line() {
                        body.push(stmt);
                    }
                }
            }
        }
    }

    /// 解析一行语句；出错时记录并跳到下一行
    fn parse_statement_line(&mut self) -> Option<Stmt> {
        match self.parse_statement() {
            Ok(stmt) => stmt,
            Err(err) => {
                self.record(err);
                self.skip_line();
                None
            }
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Stmt>> {
        let kind = self.current.kind;
        match kind {
            TokenKind::Short => self.parse_declaration(VarType::Short),
            TokenKind::Long => self.parse_declaration(VarType::Long),
            TokenKind::Float => self.parse_declaration(VarType::Float),
            TokenKind::Set => self.parse_set().map(Some),
            TokenKind::If => Ok(Some(self.parse_if())),
            TokenKind::While => Ok(Some(self.parse_while())),
            TokenKind::Return => {
                let location = self.location();
                self.advance();
                self.end_line();
                Ok(Some(Stmt::new(StmtKind::Return, location)))
            }
            TokenKind::Identifier | TokenKind::LiteralString if self.peek() == TokenKind::Arrow => {
                self.parse_explicit_statement()
            }
            TokenKind::Identifier => self.parse_name_statement(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `short|long|float <name>`，行内其余内容忽略
    fn parse_declaration(&mut self, ty: VarType) -> ParseResult<Option<Stmt>> {
        self.advance();
        if !self.check(TokenKind::Identifier) {
            return Err(self.unexpected("variable name"));
        }
        let location = self.location();
        let name = self.advance().lowercase();

        if !self.context.can_declare_locals() {
            self.errors
                .error(DiagnosticKind::LocalsNotAllowed, Some(location.clone()));
        } else if self.context.global_type(&name).is_some() {
            self.errors
                .error(DiagnosticKind::LocalShadowsGlobal(name.clone()), Some(location.clone()));
        }
        match self.locals.declare(ty, &name) {
            Ok(slot) => {
                trace!(target: "mwscript::parser", %name, %ty, slot, "Declared local");
            }
            Err(dup) => {
                self.errors
                    .error(DiagnosticKind::DuplicateLocal(dup.0), Some(location));
            }
        }
        self.end_line();
        Ok(None)
    }

    /// `set <target> to <expr>`
    fn parse_set(&mut self) -> ParseResult<Stmt> {
        let location = self.location();
        self.advance();
        let target = self.parse_target()?;
        self.expect(TokenKind::To)?;
        let value = self.parse_expression()?;
        self.end_line();
        Ok(Stmt::new(StmtKind::Set { target, value }, location))
    }

    fn parse_target(&mut self) -> ParseResult<Target> {
        let kind = self.current.kind;
        match kind {
            TokenKind::Identifier | TokenKind::LiteralString if self.peek() == TokenKind::Arrow => {
                let (object, name_token) = self.parse_reference()?;
                let name = name_token.lowercase();
                if let Some(ty) = self.context.member_type(&name, &object) {
                    return Ok(Target::Member { ty, object, name });
                }
                let location = Location::new(name_token.start(), name_token.text.clone());
                self.global_for_explicit(object, name, location)
            }
            TokenKind::Identifier => {
                let location = self.location();
                let name = self.advance().lowercase();
                self.resolve_variable(&name).ok_or_else(|| {
                    ParserError::new(DiagnosticKind::UnknownIdentifier(name), location)
                })
            }
            _ => Err(self.unexpected("variable name")),
        }
    }

    /// `if … [elseif …]* [else …] endif`
    fn parse_if(&mut self) -> Stmt {
        let location = self.location();
        self.advance();

        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut condition = self.parse_condition();
        loop {
            let body = self.parse_branch_body(&[TokenKind::Elseif, TokenKind::Else, TokenKind::Endif]);
            branches.push((condition, body));
            match self.current.kind {
                TokenKind::Elseif => {
                    self.advance();
                    condition = self.parse_condition();
                }
                TokenKind::Else => {
                    self.advance();
                    // `else set X to Y` 与换行后书写相同
                    otherwise = Some(self.parse_branch_body(&[TokenKind::Endif]));
                    break;
                }
                _ => break,
            }
        }

        if self.eat(TokenKind::Endif) {
            self.end_line();
        } else {
            let location = self.location();
            self.errors
                .error(DiagnosticKind::MissingBlockEnd("endif"), Some(location));
        }
        Stmt::new(StmtKind::If { branches, otherwise }, location)
    }

    /// `while <expr> … endwhile`
    fn parse_while(&mut self) -> Stmt {
        let location = self.location();
        self.advance();
        let condition = self.parse_condition();
        let body = self.parse_branch_body(&[TokenKind::Endwhile]);
        if self.eat(TokenKind::Endwhile) {
            self.end_line();
        } else {
            let location = self.location();
            self.errors
                .error(DiagnosticKind::MissingBlockEnd("endwhile"), Some(location));
        }
        Stmt::new(StmtKind::While { condition, body }, location)
    }

    /// 条件出错时记录并以常量 0 代替，块体照常解析
    fn parse_condition(&mut self) -> Expr {
        let location = self.location();
        match self.parse_expression() {
            Ok(expr) => expr,
            Err(err) => {
                self.record(err);
                while !self.at_line_end() {
                    self.advance();
                }
                Expr::integer(0, location)
            }
        }
    }

    /// 分支体；条件或 `else` 之后同一行可以直接跟一条语句
    fn parse_branch_body(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut body = Vec::new();
        if self.at_line_end() {
            self.eat(TokenKind::NewLine);
        } else if let Some(stmt) = self.parse_statement_line() {
            body.push(stmt);
        }
        body.extend(self.parse_block(terminators));
        body
    }

    /// 以名字开头的语句：扩展调用；单独的变量名只产生警告
    fn parse_name_statement(&mut self) -> ParseResult<Option<Stmt>> {
        let location = self.location();
        let name = self.current.lowercase();
        if self.resolve_variable(&name).is_some() {
            self.warn_here(DiagnosticKind::StrayExpression);
            self.skip_line();
            return Ok(None);
        }
        let extensions = self.extensions;
        let Some(extension) = extensions.lookup(&name) else {
            return Err(ParserError::new(DiagnosticKind::UnknownInstruction(name), location));
        };
        self.advance();
        let call = self.parse_call(extension, None, ArgMode::Statement, location.clone())?;
        self.end_line();
        Ok(Some(Stmt::new(StmtKind::Call(call), location)))
    }

    /// `obj->Name args…` 作为语句
    fn parse_explicit_statement(&mut self) -> ParseResult<Option<Stmt>> {
        let location = self.location();
        let (object, name_token) = self.parse_reference()?;
        let name = name_token.lowercase();
        let name_location = Location::new(name_token.start(), name_token.text.clone());

        if self.context.member_type(&name, &object).is_some() {
            self.errors
                .warning(DiagnosticKind::StrayExpression, Some(name_location));
            self.skip_line();
            return Ok(None);
        }
        let extensions = self.extensions;
        match extensions.lookup(&name) {
            Some(extension) => {
                let call = self.parse_call(
                    extension,
                    Some(object),
                    ArgMode::Statement,
                    name_location,
                )?;
                self.end_line();
                Ok(Some(Stmt::new(StmtKind::Call(call), location)))
            }
            None => {
                self.global_for_explicit(object, name, name_location)?;
                self.errors
                    .warning(DiagnosticKind::StrayExpression, Some(location));
                self.skip_line();
                Ok(None)
            }
        }
    }

    // ==================== 名字解析 ====================

    fn resolve_variable(&self, name: &str) -> Option<Target> {
        if let Some((ty, slot)) = self.locals.search(name) {
            return Some(Target::Local { ty, slot });
        }
        self.context.global_type(name).map(|ty| Target::Global {
            ty,
            name: name.to_string(),
        })
    }

    /// 解析 `obj->`，返回小写对象 id 与箭头后的名字 token
    fn parse_reference(&mut self) -> ParseResult<(String, Token)> {
        let object_token = self.advance();
        let object = object_token.lowercase();
        if object_token.kind == TokenKind::Identifier && !self.context.is_id(&object) {
            return Err(ParserError::new(
                DiagnosticKind::UnknownReference(object),
                Location::new(object_token.start(), object_token.text),
            ));
        }
        self.expect(TokenKind::Arrow)?;
        if !self.current.kind.is_word() {
            return Err(self.unexpected("member or function name"));
        }
        Ok((object, self.advance()))
    }

    /// 显式引用落到全局变量时忽略对象并给出警告
    fn global_for_explicit(
        &mut self,
        object: String,
        name: String,
        location: Location,
    ) -> ParseResult<Target> {
        match self.context.global_type(&name) {
            Some(ty) => {
                self.errors.warning(
                    DiagnosticKind::ExplicitReferenceIgnored {
                        object,
                        name: name.clone(),
                    },
                    Some(location),
                );
                Ok(Target::Global { ty, name })
            }
            None => Err(ParserError::new(
                DiagnosticKind::UnknownMember { object, name },
                location,
            )),
        }
    }

    // ==================== 表达式 ====================

    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_binary(1)
    }

    /// 优先级爬升，全部左结合
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = BinaryOp::from_token(self.current.kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            let location = self.location();
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::binary(op, left, right, location);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        match self.current.kind {
            TokenKind::Minus => {
                let location = self.location();
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::negate(operand, location))
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let location = self.location();
        let kind = self.current.kind;
        match kind {
            TokenKind::LiteralInteger | TokenKind::LiteralFloat => {
                let token = self.advance();
                Ok(number_expr(&token, location))
            }
            TokenKind::LeftParenthesis => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParenthesis)?;
                Ok(expr)
            }
            TokenKind::Identifier | TokenKind::LiteralString if self.peek() == TokenKind::Arrow => {
                self.parse_explicit_operand()
            }
            TokenKind::Identifier => {
                let name = self.current.lowercase();
                if let Some(target) = self.resolve_variable(&name) {
                    self.advance();
                    return Ok(Expr::variable(target, location));
                }
                let extensions = self.extensions;
                let Some(extension) = extensions.lookup(&name) else {
                    return Err(ParserError::new(
                        DiagnosticKind::UnknownIdentifier(name),
                        location,
                    ));
                };
                self.advance();
                self.function_call(extension, None, location)
            }
            TokenKind::LiteralString => Err(ParserError::new(
                DiagnosticKind::StringNotAllowed,
                location,
            )),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// 表达式中的 `obj->name`：成员变量、显式函数调用或全局变量
    fn parse_explicit_operand(&mut self) -> ParseResult<Expr> {
        let (object, name_token) = self.parse_reference()?;
        let name = name_token.lowercase();
        let location = Location::new(name_token.start(), name_token.text.clone());

        if let Some(ty) = self.context.member_type(&name, &object) {
            return Ok(Expr::variable(Target::Member { ty, object, name }, location));
        }
        let extensions = self.extensions;
        if let Some(extension) = extensions.lookup(&name) {
            return self.function_call(extension, Some(object), location);
        }
        let target = self.global_for_explicit(object, name, location.clone())?;
        Ok(Expr::variable(target, location))
    }

    fn function_call(
        &mut self,
        extension: &Extension,
        explicit_ref: Option<String>,
        location: Location,
    ) -> ParseResult<Expr> {
        let Some(returns) = extension.returns() else {
            return Err(ParserError::new(
                DiagnosticKind::NotAFunction(extension.name.clone()),
                location,
            ));
        };
        let call = self.parse_call(extension, explicit_ref, ArgMode::Expression, location.clone())?;
        Ok(Expr::new(ExprKind::Call(Box::new(call)), returns, location))
    }

    // ==================== 参数 ====================

    fn parse_call(
        &mut self,
        extension: &Extension,
        explicit_ref: Option<String>,
        mode: ArgMode,
        location: Location,
    ) -> ParseResult<Call> {
        let opcode = extension.opcode(explicit_ref.is_some()).ok_or_else(|| {
            ParserError::new(
                DiagnosticKind::NoExplicitReference(extension.name.clone()),
                location.clone(),
            )
        })?;

        let signature = &extension.signature;
        let mut args = Vec::with_capacity(signature.args().len());
        let mut optional_count = 0;
        for (index, &kind) in signature.args().iter().enumerate() {
            let optional = index >= signature.required();
            if optional && !self.can_start_argument(mode) {
                break;
            }
            if !optional && self.argument_missing(mode) {
                return Err(ParserError::new(
                    DiagnosticKind::MissingArgument(extension.name.clone()),
                    self.location(),
                ));
            }
            if let Some(arg) = self.parse_argument(kind, mode)? {
                args.push(arg);
                if optional {
                    optional_count += 1;
                }
            }
            self.eat(TokenKind::Comma);
        }

        Ok(Call {
            name: extension.name.clone(),
            opcode,
            explicit_ref,
            args,
            optional_count,
            returns: extension.returns(),
            location,
        })
    }

    fn argument_missing(&self, mode: ArgMode) -> bool {
        self.at_line_end()
            || (mode == ArgMode::Expression && self.check(TokenKind::RightParenthesis))
    }

    /// 可选参数是否继续：表达式中遇到运算符即停止
    fn can_start_argument(&self, mode: ArgMode) -> bool {
        match self.current.kind {
            TokenKind::LiteralInteger
            | TokenKind::LiteralFloat
            | TokenKind::LiteralString
            | TokenKind::Identifier
            | TokenKind::LeftParenthesis => true,
            TokenKind::Minus => mode == ArgMode::Statement,
            _ => false,
        }
    }

    fn parse_argument(&mut self, kind: ArgKind, mode: ArgMode) -> ParseResult<Option<CallArg>> {
        match kind {
            ArgKind::Integer | ArgKind::Float => {
                let expr = if self.check(TokenKind::LiteralString) {
                    self.string_as_number(kind)?
                } else if mode == ArgMode::Statement {
                    self.parse_expression()?
                } else {
                    self.parse_unary()?
                };
                Ok(Some(CallArg::Value { expr, kind }))
            }
            ArgKind::Name => {
                if !(self.current.kind.is_word() || self.check(TokenKind::LiteralString)) {
                    return Err(self.unexpected("name"));
                }
                Ok(Some(CallArg::Text(self.advance().lowercase())))
            }
            ArgKind::Text => {
                if !(self.current.kind.is_word() || self.check(TokenKind::LiteralString)) {
                    return Err(self.unexpected("string"));
                }
                Ok(Some(CallArg::Text(self.advance().text)))
            }
            ArgKind::Ignored => {
                self.advance();
                Ok(None)
            }
        }
    }

    /// 数值参数写成字符串（`setscale "0.3"`）时在编译期转换
    fn string_as_number(&mut self, kind: ArgKind) -> ParseResult<Expr> {
        let location = self.location();
        let token = self.advance();
        let text = token.text.trim();
        let parsed = match kind {
            ArgKind::Integer => text
                .parse::<i32>()
                .ok()
                .or_else(|| text.parse::<f32>().ok().map(|v| v as i32))
                .map(|v| Expr::integer(v, location.clone())),
            _ => text
                .parse::<f32>()
                .ok()
                .map(|v| Expr::float(v, location.clone())),
        };
        parsed.ok_or_else(|| ParserError::new(DiagnosticKind::NotANumber(token.text), location))
    }
}

fn number_expr(token: &Token, location: Location) -> Expr {
    match token.value {
        TokenValue::Float(v) => Expr::float(v, location),
        TokenValue::Integer(v) => Expr::integer(v, location),
        TokenValue::None => Expr::integer(0, location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::context::StaticCompilerContext;
    use crate::extensions::register_standard;
    use crate::types::ValueType;

    fn parse_with(
        source: &str,
        context: &StaticCompilerContext,
        extensions: &Extensions,
    ) -> (Result<ScriptAst, CompileError>, ErrorHandler) {
        let mut errors = ErrorHandler::new();
        let result = Parser::new(source, context, extensions, &mut errors).parse();
        (result, errors)
    }

    fn parse(source: &str) -> (Result<ScriptAst, CompileError>, ErrorHandler) {
        let mut extensions = Extensions::new();
        register_standard(&mut extensions).unwrap();
        let context = StaticCompilerContext::new()
            .with_global("GameHour", VarType::Float)
            .with_id("player");
        parse_with(source, &context, &extensions)
    }

    #[test]
    fn test_missing_begin_is_unrecoverable() {
        let (result, errors) = parse("this is not a valid script");
        assert!(matches!(result, Err(CompileError::Unrecoverable(_))));
        assert!(!errors.is_good());
    }

    #[test]
    fn test_begin_and_end_leniency() {
        let (result, errors) = parse("Begin, GlassDisplayScript\nEnd, SomethingElse\n");
        assert!(errors.is_good());
        assert_eq!(result.unwrap().name, "GlassDisplayScript");

        let (result, errors) = parse("Begin Begin\nEnd Begin");
        assert!(errors.is_good());
        assert_eq!(result.unwrap().name, "Begin");
    }

    #[test]
    fn test_missing_end_is_recorded() {
        let (result, errors) = parse("begin test\nshort a\n");
        assert!(result.is_ok());
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::MissingEnd));
    }

    #[test]
    fn test_declaration_tolerates_junk() {
        let (result, errors) = parse("begin test\nfloat X : some comment - 1.0\nend");
        let ast = result.unwrap();
        assert!(errors.is_good());
        assert_eq!(errors.warning_count(), 1);
        assert_eq!(ast.locals.search("x"), Some((VarType::Float, 0)));
    }

    #[test]
    fn test_duplicate_and_shadowing_locals() {
        let (_, errors) = parse("begin test\nshort a\nlong A\nfloat gamehour\nend");
        let kinds: Vec<_> = errors.errors().map(|d| d.kind.clone()).collect();
        assert!(kinds.contains(&DiagnosticKind::DuplicateLocal("a".into())));
        assert!(kinds.contains(&DiagnosticKind::LocalShadowsGlobal("gamehour".into())));
    }

    #[test]
    fn test_precedence_and_typing() {
        let (result, errors) = parse("begin test\nshort a\nset a to 1 + 2 * 3.0\nend");
        assert!(errors.is_good());
        let ast = result.unwrap();
        let StmtKind::Set { value, .. } = &ast.body[0].kind else {
            panic!("expected set");
        };
        assert_eq!(value.ty, ValueType::Float);
        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_if_chain_and_same_line_else() {
        let source = "begin test\nshort a\nif ( a == 1 )\nset a to 2\nelseif ( a == 2 )\nset a to 3\nelse set a to 4\nendif\nend";
        let (result, errors) = parse(source);
        assert!(errors.is_good(), "{:?}", errors.diagnostics());
        let ast = result.unwrap();
        let StmtKind::If { branches, otherwise } = &ast.body[0].kind else {
            panic!("expected if");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(otherwise.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_syntax_error_recovers_on_next_line() {
        let (_, errors) = parse("begin test\nshort a\nset a 1\nset b to 2\nset a to )\nend");
        assert_eq!(errors.error_count(), 3);
    }

    #[test]
    fn test_unknown_instruction() {
        let (_, errors) = parse("begin test\nFrobnicate 1\nend");
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::UnknownInstruction("frobnicate".into())));
    }

    #[test]
    fn test_call_arguments() {
        let (result, errors) = parse("begin test\nMessageBox \"Hour %f\" gamehour\nAddTopic \"Example\"\nend");
        assert!(errors.is_good(), "{:?}", errors.diagnostics());
        let ast = result.unwrap();
        let StmtKind::Call(call) = &ast.body[0].kind else {
            panic!("expected call");
        };
        assert_eq!(call.optional_count, 1);
        assert_eq!(call.args.len(), 2);
        let StmtKind::Call(call) = &ast.body[1].kind else {
            panic!("expected call");
        };
        assert_eq!(call.args, vec![CallArg::Text("Example".into())]);
    }

    #[test]
    fn test_string_argument_converted_to_number() {
        let (result, errors) = parse("begin test\nsetscale \"0.3\"\nsetscale \"big\"\nend");
        assert_eq!(errors.error_count(), 1);
        let ast = result.unwrap();
        let StmtKind::Call(call) = &ast.body[0].kind else {
            panic!("expected call");
        };
        assert!(matches!(
            &call.args[0],
            CallArg::Value { expr, .. } if expr.kind == ExprKind::Float(0.3)
        ));
    }

    #[test]
    fn test_explicit_reference() {
        let (result, errors) = parse("begin test\nfloat h\nset h to player->GetHealth\nplayer->SetHealth 10\nend");
        assert!(errors.is_good(), "{:?}", errors.diagnostics());
        let ast = result.unwrap();
        let StmtKind::Call(call) = &ast.body[1].kind else {
            panic!("expected call");
        };
        assert_eq!(call.explicit_ref.as_deref(), Some("player"));

        let (_, errors) = parse("begin test\nnobody->SetHealth 10\nend");
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::UnknownReference("nobody".into())));
    }

    #[test]
    fn test_explicit_global_warns() {
        let (result, errors) = parse("begin test\nset player->gamehour to 5\nend");
        assert!(errors.is_good());
        assert_eq!(errors.warning_count(), 1);
        let ast = result.unwrap();
        assert!(matches!(
            &ast.body[0].kind,
            StmtKind::Set { target: Target::Global { .. }, .. }
        ));
    }

    #[test]
    fn test_function_in_expression_takes_single_operands() {
        let mut extensions = Extensions::new();
        extensions
            .register_function(
                "GetFoo",
                ValueType::Integer,
                "l",
                crate::bytecode::Opcode::segment4(1),
                None,
            )
            .unwrap();
        let context = StaticCompilerContext::new();
        let (result, errors) = parse_with(
            "begin test\nshort a\nset a to GetFoo 5 > 3\nend",
            &context,
            &extensions,
        );
        assert!(errors.is_good(), "{:?}", errors.diagnostics());
        let ast = result.unwrap();
        let StmtKind::Set { value, .. } = &ast.body[0].kind else {
            panic!("expected set");
        };
        assert!(matches!(value.kind, ExprKind::Binary { op: BinaryOp::Greater, .. }));
    }

    #[test]
    fn test_instruction_is_not_a_function() {
        let (_, errors) = parse("begin test\nshort a\nset a to AddTopic \"x\"\nend");
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::NotAFunction("addtopic".into())));
    }

    #[test]
    fn test_locals_forbidden() {
        let context = StaticCompilerContext::new().forbid_locals();
        let (_, errors) = parse_with("begin test\nshort a\nend", &context, &Extensions::new());
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::LocalsNotAllowed));
    }

    #[test]
    fn test_stray_block_end() {
        let (_, errors) = parse("begin test\nendif\nend");
        assert!(errors
            .errors()
            .any(|d| d.kind == DiagnosticKind::StrayBlockEnd("endif".into())));
    }
}
