//! 表达式编译

use super::CodeGenerator;
use crate::bytecode::{EncodeError, Instruction, Op0, Op1, Op2, Segment};
use crate::compiler::parser::{BinaryOp, Call, CallArg, Expr, ExprKind};
use crate::extensions::ArgKind;
use crate::types::ValueType;

/// 编译表达式，结果留在栈顶
pub fn compile_expr(gen: &mut CodeGenerator<'_>, expr: &Expr) -> Result<(), EncodeError> {
    match &expr.kind {
        ExprKind::Integer(value) => {
            let index = gen.literals.add_integer(*value);
            gen.code.emit_op0(Op0::PushInt, index)?;
        }
        ExprKind::Float(value) => {
            let index = gen.literals.add_float(*value);
            gen.code.emit_op0(Op0::PushFloat, index)?;
        }
        ExprKind::Local { ty, slot } => {
            gen.code.emit_op0(Op0::fetch_local(*ty), *slot)?;
        }
        ExprKind::Global { ty, name } => {
            let index = gen.literals.add_string(name);
            gen.code.emit_op0(Op0::fetch_global(*ty), index)?;
        }
        ExprKind::Member { ty, object, name } => {
            let a = gen.literals.add_string(object);
            let b = gen.literals.add_string(name);
            gen.code.emit(Instruction::Segment2 {
                op: Op2::fetch_member(*ty),
                a,
                b,
            })?;
        }
        ExprKind::Negate(operand) => {
            compile_expr(gen, operand)?;
            let op = match operand.ty {
                ValueType::Integer => Op1::NegateInt,
                ValueType::Float => Op1::NegateFloat,
            };
            gen.code.emit_op1(op)?;
        }
        ExprKind::Binary { op, left, right } => {
            compile_expr(gen, left)?;
            compile_expr(gen, right)?;
            let ty = left.ty.promote(right.ty);
            if ty == ValueType::Float {
                // 左操作数在次栈顶
                if left.ty == ValueType::Integer {
                    gen.code.emit_op1(Op1::IntToFloatBelow)?;
                }
                if right.ty == ValueType::Integer {
                    gen.code.emit_op1(Op1::IntToFloat)?;
                }
            }
            gen.code.emit_op1(binary_op(*op, ty))?;
        }
        ExprKind::Call(call) => compile_call(gen, call)?,
    }
    Ok(())
}

/// 参数逆序压栈，使第一个参数位于栈顶；显式引用最后压入
pub fn compile_call(gen: &mut CodeGenerator<'_>, call: &Call) -> Result<(), EncodeError> {
    for arg in call.args.iter().rev() {
        match arg {
            CallArg::Value { expr, kind } => {
                compile_expr(gen, expr)?;
                let wanted = match kind {
                    ArgKind::Float => ValueType::Float,
                    _ => ValueType::Integer,
                };
                emit_conversion(gen, expr.ty, wanted)?;
            }
            CallArg::Text(text) => emit_string(gen, text)?,
        }
    }
    if let Some(object) = &call.explicit_ref {
        emit_string(gen, object)?;
    }
    let arg = if call.opcode.segment == Segment::Three {
        call.optional_count
    } else {
        0
    };
    gen.code.emit(Instruction::Extension {
        opcode: call.opcode,
        arg,
    })?;
    Ok(())
}

pub fn emit_conversion(
    gen: &mut CodeGenerator<'_>,
    from: ValueType,
    to: ValueType,
) -> Result<(), EncodeError> {
    match (from, to) {
        (ValueType::Integer, ValueType::Float) => {
            gen.code.emit_op1(Op1::IntToFloat)?;
        }
        (ValueType::Float, ValueType::Integer) => {
            gen.code.emit_op1(Op1::FloatToInt)?;
        }
        _ => {}
    }
    Ok(())
}

fn emit_string(gen: &mut CodeGenerator<'_>, text: &str) -> Result<(), EncodeError> {
    let index = gen.literals.add_string(text);
    gen.code.emit_op0(Op0::PushString, index)?;
    Ok(())
}

fn binary_op(op: BinaryOp, ty: ValueType) -> Op1 {
    let float = ty == ValueType::Float;
    match (op, float) {
        (BinaryOp::Add, false) => Op1::AddInt,
        (BinaryOp::Add, true) => Op1::AddFloat,
        (BinaryOp::Sub, false) => Op1::SubInt,
        (BinaryOp::Sub, true) => Op1::SubFloat,
        (BinaryOp::Mul, false) => Op1::MulInt,
        (BinaryOp::Mul, true) => Op1::MulFloat,
        (BinaryOp::Div, false) => Op1::DivInt,
        (BinaryOp::Div, true) => Op1::DivFloat,
        (BinaryOp::Equal, false) => Op1::EqualInt,
        (BinaryOp::Equal, true) => Op1::EqualFloat,
        (BinaryOp::NotEqual, false) => Op1::NotEqualInt,
        (BinaryOp::NotEqual, true) => Op1::NotEqualFloat,
        (BinaryOp::Less, false) => Op1::LessInt,
        (BinaryOp::Less, true) => Op1::LessFloat,
        (BinaryOp::LessEqual, false) => Op1::LessEqualInt,
        (BinaryOp::LessEqual, true) => Op1::LessEqualFloat,
        (BinaryOp::Greater, false) => Op1::GreaterInt,
        (BinaryOp::Greater, true) => Op1::GreaterFloat,
        (BinaryOp::GreaterEqual, false) => Op1::GreaterEqualInt,
        (BinaryOp::GreaterEqual, true) => Op1::GreaterEqualFloat,
    }
}
