//! 内存宿主：为标准扩展安装处理函数
//!
//! 生命值与缩放保存在对象的 `health`/`scale` 成员变量里（环境文件未声明时
//! 读取默认值，写入只记日志）。`MessageBox` 输出到 stdout，其余指令记日志。

use mwscript_core::bytecode::Opcode;
use mwscript_core::extensions::{codes, Extensions, RegistryError};
use mwscript_core::runtime::{ContextError, Runtime};
use mwscript_core::{Data, RuntimeFault, VarType};
use tracing::{debug, info};

const DEFAULT_HEALTH: f32 = 100.0;
const DEFAULT_SCALE: f32 = 1.0;

/// 安装标准指令的处理函数；脚本控制类由 API 层安装
pub fn install(extensions: &mut Extensions, owner: &str) -> Result<(), RegistryError> {
    extensions.install(codes::ADD_TOPIC, |runtime, _| {
        let topic = runtime.pop_string()?;
        info!(target: "mwscript::cli", topic, "AddTopic");
        Ok(())
    })?;

    extensions.install(codes::JOURNAL, |runtime, _| {
        let quest = runtime.pop_string()?;
        let index = runtime.pop_integer()?;
        info!(target: "mwscript::cli", quest, index, "Journal");
        Ok(())
    })?;

    extensions.install(codes::MESSAGE_BOX, |runtime, optional| {
        let format = runtime.pop_string()?;
        let values = (0..optional)
            .map(|_| runtime.pop_float())
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", format_message(format, &values));
        Ok(())
    })?;

    for (code, explicit) in [
        (codes::ON_ACTIVATE, false),
        (codes::ON_ACTIVATE_EXPLICIT, true),
    ] {
        let owner = owner.to_string();
        extensions.install(code, move |runtime, _| {
            let object = target(runtime, explicit, &owner)?;
            debug!(target: "mwscript::cli", %object, "OnActivate");
            runtime.push_integer(0)
        })?;
    }

    install_float_member(
        extensions,
        owner,
        "health",
        DEFAULT_HEALTH,
        [codes::GET_HEALTH, codes::GET_HEALTH_EXPLICIT],
        [codes::SET_HEALTH, codes::SET_HEALTH_EXPLICIT],
        [codes::MOD_HEALTH, codes::MOD_HEALTH_EXPLICIT],
    )?;
    install_float_member(
        extensions,
        owner,
        "scale",
        DEFAULT_SCALE,
        [codes::GET_SCALE, codes::GET_SCALE_EXPLICIT],
        [codes::SET_SCALE, codes::SET_SCALE_EXPLICIT],
        [],
    )?;
    Ok(())
}

/// 指令作用的对象：显式引用在栈顶，否则为默认对象
fn target(runtime: &mut Runtime<'_>, explicit: bool, owner: &str) -> Result<String, RuntimeFault> {
    if explicit {
        Ok(runtime.pop_string()?.to_string())
    } else {
        Ok(owner.to_string())
    }
}

/// 未声明的成员读默认值，其余上下文错误照常上报
fn read_member(
    runtime: &mut Runtime<'_>,
    object: &str,
    member: &str,
    default: f32,
) -> Result<f32, RuntimeFault> {
    match runtime.context().get_member(object, member, VarType::Float) {
        Ok(value) => Ok(value.as_float()),
        Err(ContextError::UnknownMember { .. }) => Ok(default),
        Err(e) => Err(RuntimeFault::from(e)),
    }
}

fn write_member(
    runtime: &mut Runtime<'_>,
    object: &str,
    member: &str,
    value: f32,
) -> Result<(), RuntimeFault> {
    info!(target: "mwscript::cli", object, member, value, "Set member");
    match runtime
        .context()
        .set_member(object, member, VarType::Float, Data::Float(value))
    {
        Err(ContextError::UnknownMember { .. }) => {
            debug!(target: "mwscript::cli", object, member, "Member not declared, value dropped");
            Ok(())
        }
        other => other.map_err(RuntimeFault::from),
    }
}

fn install_float_member<const M: usize>(
    extensions: &mut Extensions,
    owner: &str,
    member: &'static str,
    default: f32,
    get: [Opcode; 2],
    set: [Opcode; 2],
    modify: [Opcode; M],
) -> Result<(), RegistryError> {
    for (code, explicit) in get.into_iter().zip([false, true]) {
        let owner = owner.to_string();
        extensions.install(code, move |runtime, _| {
            let object = target(runtime, explicit, &owner)?;
            let value = read_member(runtime, &object, member, default)?;
            runtime.push_float(value)
        })?;
    }
    for (code, explicit) in set.into_iter().zip([false, true]) {
        let owner = owner.to_string();
        extensions.install(code, move |runtime, _| {
            let object = target(runtime, explicit, &owner)?;
            let value = runtime.pop_float()?;
            write_member(runtime, &object, member, value)
        })?;
    }
    for (code, explicit) in modify.into_iter().zip([false, true]) {
        let owner = owner.to_string();
        extensions.install(code, move |runtime, _| {
            let object = target(runtime, explicit, &owner)?;
            let delta = runtime.pop_float()?;
            let value = read_member(runtime, &object, member, default)? + delta;
            write_member(runtime, &object, member, value)
        })?;
    }
    Ok(())
}

/// 按 `%g`、`%f`、`%.Nf`、`%%` 把数值填进消息
pub fn format_message(format: &str, values: &[f32]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut values = values.iter();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            precision = digits.parse::<usize>().ok();
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('g' | 'G') => {
                if let Some(v) = values.next() {
                    out.push_str(&v.to_string());
                }
            }
            Some('f' | 'F') => {
                if let Some(v) = values.next() {
                    out.push_str(&format!("{:.*}", precision.unwrap_or(6), v));
                }
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
