//! 段 1 指令：算术、转换、比较

use super::stack::Runtime;
use crate::bytecode::Op1;
use crate::runtime::error::RuntimeFault;
use crate::runtime::value::Data;

/// 指令执行后的控制流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Return,
}

pub(super) fn execute(runtime: &mut Runtime<'_>, op: Op1) -> Result<Flow, RuntimeFault> {
    match op {
        Op1::AddInt => int_binary(runtime, |a, b| Ok(a.wrapping_add(b)))?,
        Op1::SubInt => int_binary(runtime, |a, b| Ok(a.wrapping_sub(b)))?,
        Op1::MulInt => int_binary(runtime, |a, b| Ok(a.wrapping_mul(b)))?,
        Op1::DivInt => {
            let pc = runtime.pc();
            // 向零截断
            int_binary(runtime, |a, b| {
                if b == 0 {
                    Err(RuntimeFault::DivisionByZero { pc })
                } else {
                    Ok(a.wrapping_div(b))
                }
            })?
        }
        Op1::AddFloat => float_binary(runtime, |a, b| Ok(a + b))?,
        Op1::SubFloat => float_binary(runtime, |a, b| Ok(a - b))?,
        Op1::MulFloat => float_binary(runtime, |a, b| Ok(a * b))?,
        Op1::DivFloat => {
            let pc = runtime.pc();
            float_binary(runtime, |a, b| {
                if b == 0.0 {
                    Err(RuntimeFault::DivisionByZero { pc })
                } else {
                    Ok(a / b)
                }
            })?
        }
        Op1::NegateInt => {
            let v = runtime.pop_integer()?;
            runtime.push_integer(v.wrapping_neg())?;
        }
        Op1::NegateFloat => {
            let v = runtime.pop_float()?;
            runtime.push_float(-v)?;
        }
        Op1::IntToFloat => convert_to_float(runtime, 0)?,
        Op1::FloatToInt => convert_to_integer(runtime, 0)?,
        Op1::IntToFloatBelow => convert_to_float(runtime, 1)?,
        Op1::FloatToIntBelow => convert_to_integer(runtime, 1)?,
        Op1::EqualInt => int_compare(runtime, |a, b| a == b)?,
        Op1::NotEqualInt => int_compare(runtime, |a, b| a != b)?,
        Op1::LessInt => int_compare(runtime, |a, b| a < b)?,
        Op1::LessEqualInt => int_compare(runtime, |a, b| a <= b)?,
        Op1::GreaterInt => int_compare(runtime, |a, b| a > b)?,
        Op1::GreaterEqualInt => int_compare(runtime, |a, b| a >= b)?,
        Op1::EqualFloat => float_compare(runtime, |a, b| a == b)?,
        Op1::NotEqualFloat => float_compare(runtime, |a, b| a != b)?,
        Op1::LessFloat => float_compare(runtime, |a, b| a < b)?,
        Op1::LessEqualFloat => float_compare(runtime, |a, b| a <= b)?,
        Op1::GreaterFloat => float_compare(runtime, |a, b| a > b)?,
        Op1::GreaterEqualFloat => float_compare(runtime, |a, b| a >= b)?,
        Op1::Pop => {
            runtime.pop()?;
        }
        Op1::Return => return Ok(Flow::Return),
    }
    Ok(Flow::Continue)
}

fn int_binary(
    runtime: &mut Runtime<'_>,
    f: impl FnOnce(i32, i32) -> Result<i32, RuntimeFault>,
) -> Result<(), RuntimeFault> {
    let b = runtime.pop_integer()?;
    let a = runtime.pop_integer()?;
    runtime.push_integer(f(a, b)?)
}

fn float_binary(
    runtime: &mut Runtime<'_>,
    f: impl FnOnce(f32, f32) -> Result<f32, RuntimeFault>,
) -> Result<(), RuntimeFault> {
    let b = runtime.pop_float()?;
    let a = runtime.pop_float()?;
    runtime.push_float(f(a, b)?)
}

fn int_compare(
    runtime: &mut Runtime<'_>,
    f: impl FnOnce(i32, i32) -> bool,
) -> Result<(), RuntimeFault> {
    let b = runtime.pop_integer()?;
    let a = runtime.pop_integer()?;
    runtime.push_integer(i32::from(f(a, b)))
}

fn float_compare(
    runtime: &mut Runtime<'_>,
    f: impl FnOnce(f32, f32) -> bool,
) -> Result<(), RuntimeFault> {
    let b = runtime.pop_float()?;
    let a = runtime.pop_float()?;
    runtime.push_integer(i32::from(f(a, b)))
}

fn convert_to_float(runtime: &mut Runtime<'_>, depth: usize) -> Result<(), RuntimeFault> {
    let expected = runtime.type_mismatch(crate::types::ValueType::Integer);
    let slot = runtime.peek_mut(depth)?;
    match *slot {
        Data::Integer(v) => {
            *slot = Data::Float(v as f32);
            Ok(())
        }
        Data::Float(_) => Err(expected),
    }
}

fn convert_to_integer(runtime: &mut Runtime<'_>, depth: usize) -> Result<(), RuntimeFault> {
    let expected = runtime.type_mismatch(crate::types::ValueType::Float);
    let slot = runtime.peek_mut(depth)?;
    match *slot {
        Data::Float(v) => {
            *slot = Data::Integer(v as i32);
            Ok(())
        }
        Data::Integer(_) => Err(expected),
    }
}
