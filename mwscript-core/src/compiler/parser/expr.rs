//! 表达式语法树
//!
//! 解析阶段已完成名字解析与类型推导：每个节点携带静态类型，
//! 代码生成只需按类型插入转换指令。

use crate::bytecode::Opcode;
use crate::compiler::diagnostics::Location;
use crate::compiler::lexer::TokenKind;
use crate::extensions::ArgKind;
use crate::types::{ValueType, VarType};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: ValueType,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(i32),
    Float(f32),
    Local {
        ty: VarType,
        slot: u32,
    },
    Global {
        ty: VarType,
        name: String,
    },
    Member {
        ty: VarType,
        object: String,
        name: String,
    },
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call(Box<Call>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: ValueType, location: Location) -> Self {
        Self { kind, ty, location }
    }

    pub fn integer(value: i32, location: Location) -> Self {
        Self::new(ExprKind::Integer(value), ValueType::Integer, location)
    }

    pub fn float(value: f32, location: Location) -> Self {
        Self::new(ExprKind::Float(value), ValueType::Float, location)
    }

    /// 变量读取
    pub fn variable(target: Target, location: Location) -> Self {
        let ty = target.var_type().value_type();
        let kind = match target {
            Target::Local { ty, slot } => ExprKind::Local { ty, slot },
            Target::Global { ty, name } => ExprKind::Global { ty, name },
            Target::Member { ty, object, name } => ExprKind::Member { ty, object, name },
        };
        Self::new(kind, ty, location)
    }

    /// 取负；字面量直接折叠
    pub fn negate(operand: Expr, location: Location) -> Self {
        match operand.kind {
            ExprKind::Integer(v) => Self::integer(v.wrapping_neg(), location),
            ExprKind::Float(v) => Self::float(-v, location),
            _ => {
                let ty = operand.ty;
                Self::new(ExprKind::Negate(Box::new(operand)), ty, location)
            }
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, location: Location) -> Self {
        let ty = if op.is_comparison() {
            ValueType::Integer
        } else {
            left.ty.promote(right.ty)
        };
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            location,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Asterisk => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::DoubleEqual => BinaryOp::Equal,
            TokenKind::ExclamationEqual => BinaryOp::NotEqual,
            TokenKind::LessThan => BinaryOp::Less,
            TokenKind::LessThanEqual => BinaryOp::LessEqual,
            TokenKind::GreaterThan => BinaryOp::Greater,
            TokenKind::GreaterThanEqual => BinaryOp::GreaterEqual,
            _ => return None,
        })
    }

    /// 优先级：比较 < 加减 < 乘除，全部左结合
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div => 3,
            BinaryOp::Add | BinaryOp::Sub => 2,
            _ => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 1
    }
}

/// 扩展调用
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// 小写名字，仅用于诊断
    pub name: String,
    pub opcode: Opcode,
    /// `obj->Name` 中的对象 id（小写）
    pub explicit_ref: Option<String>,
    /// 按书写顺序排列
    pub args: Vec<CallArg>,
    /// 实际给出的可选参数个数
    pub optional_count: u32,
    pub returns: Option<ValueType>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Value { expr: Expr, kind: ArgKind },
    Text(String),
}

/// 赋值目标，也用作变量读取的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Local {
        ty: VarType,
        slot: u32,
    },
    Global {
        ty: VarType,
        name: String,
    },
    Member {
        ty: VarType,
        object: String,
        name: String,
    },
}

impl Target {
    pub fn var_type(&self) -> VarType {
        match self {
            Target::Local { ty, .. } | Target::Global { ty, .. } | Target::Member { ty, .. } => *ty,
        }
    }
}
