//! 运行时上下文
//!
//! 虚拟机通过 [`Context`] 读写脚本所见的全部状态。写入前值已按目标类型收窄
//! （short 截断为 16 位，long 为整数，float 为浮点）。

use std::collections::{BTreeSet, HashMap};

use super::error::ContextError;
use super::value::Data;
use crate::bytecode::{CompiledScript, Locals};
use crate::types::VarType;

pub trait Context {
    fn get_local(&self, ty: VarType, slot: u32) -> Result<Data, ContextError>;

    fn set_local(&mut self, ty: VarType, slot: u32, value: Data) -> Result<(), ContextError>;

    fn get_global(&self, name: &str, _ty: VarType) -> Result<Data, ContextError> {
        Err(ContextError::UnknownGlobal(name.to_string()))
    }

    fn set_global(&mut self, name: &str, _ty: VarType, _value: Data) -> Result<(), ContextError> {
        Err(ContextError::UnknownGlobal(name.to_string()))
    }

    fn get_member(&self, object: &str, name: &str, _ty: VarType) -> Result<Data, ContextError> {
        Err(ContextError::UnknownMember {
            object: object.to_string(),
            name: name.to_string(),
        })
    }

    fn set_member(
        &mut self,
        object: &str,
        name: &str,
        _ty: VarType,
        _value: Data,
    ) -> Result<(), ContextError> {
        Err(ContextError::UnknownMember {
            object: object.to_string(),
            name: name.to_string(),
        })
    }

    // ==================== 脚本控制钩子 ====================

    fn start_script(&mut self, _name: &str) {}

    fn stop_script(&mut self, _name: &str) {}

    fn is_script_running(&self, _name: &str) -> bool {
        false
    }
}

/// 把值收窄到变量类型
pub fn narrow(ty: VarType, value: Data) -> Data {
    match ty {
        VarType::Short => Data::Integer(i32::from(value.as_integer() as i16)),
        VarType::Long => Data::Integer(value.as_integer()),
        VarType::Float => Data::Float(value.as_float()),
    }
}

/// 按脚本局部变量表分配的类型化存储
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalVariables {
    pub shorts: Vec<i16>,
    pub longs: Vec<i32>,
    pub floats: Vec<f32>,
}

impl LocalVariables {
    /// 按局部变量表分配并清零
    pub fn configure(locals: &Locals) -> Self {
        Self {
            shorts: vec![0; locals.count(VarType::Short)],
            longs: vec![0; locals.count(VarType::Long)],
            floats: vec![0.0; locals.count(VarType::Float)],
        }
    }

    pub fn get(&self, ty: VarType, slot: u32) -> Result<Data, ContextError> {
        let index = slot as usize;
        let value = match ty {
            VarType::Short => self.shorts.get(index).map(|&v| Data::from(v)),
            VarType::Long => self.longs.get(index).map(|&v| Data::from(v)),
            VarType::Float => self.floats.get(index).map(|&v| Data::from(v)),
        };
        value.ok_or(ContextError::UnknownLocal { ty, slot })
    }

    pub fn set(&mut self, ty: VarType, slot: u32, value: Data) -> Result<(), ContextError> {
        let index = slot as usize;
        let missing = ContextError::UnknownLocal { ty, slot };
        match ty {
            VarType::Short => *self.shorts.get_mut(index).ok_or(missing)? = value.as_integer() as i16,
            VarType::Long => *self.longs.get_mut(index).ok_or(missing)? = value.as_integer(),
            VarType::Float => *self.floats.get_mut(index).ok_or(missing)? = value.as_float(),
        }
        Ok(())
    }

    /// 按名字读取（调试、测试与命令行输出用）
    pub fn get_by_name(&self, locals: &Locals, name: &str) -> Option<Data> {
        let (ty, slot) = locals.search(name)?;
        self.get(ty, slot).ok()
    }
}

/// 完全在内存中的上下文：局部变量、全局变量、成员变量与运行中脚本集合
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    pub locals: LocalVariables,
    globals: HashMap<String, (VarType, Data)>,
    members: HashMap<(String, String), (VarType, Data)>,
    running: BTreeSet<String>,
}

impl MemoryContext {
    /// 为脚本分配局部变量
    pub fn new(script: &CompiledScript) -> Self {
        Self::with_locals(LocalVariables::configure(script.locals()))
    }

    pub fn with_locals(locals: LocalVariables) -> Self {
        Self {
            locals,
            ..Self::default()
        }
    }

    pub fn define_global(&mut self, name: &str, ty: VarType, value: Data) {
        self.globals
            .insert(name.to_lowercase(), (ty, narrow(ty, value)));
    }

    pub fn define_member(&mut self, object: &str, name: &str, ty: VarType, value: Data) {
        self.members.insert(
            (object.to_lowercase(), name.to_lowercase()),
            (ty, narrow(ty, value)),
        );
    }

    pub fn global(&self, name: &str) -> Option<Data> {
        self.globals.get(&name.to_lowercase()).map(|(_, v)| *v)
    }

    pub fn member(&self, object: &str, name: &str) -> Option<Data> {
        self.members
            .get(&(object.to_lowercase(), name.to_lowercase()))
            .map(|(_, v)| *v)
    }

    pub fn running_scripts(&self) -> impl Iterator<Item = &str> {
        self.running.iter().map(String::as_str)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, VarType, Data)> {
        self.globals
            .iter()
            .map(|(name, (ty, value))| (name.as_str(), *ty, *value))
    }
}

impl Context for MemoryContext {
    fn get_local(&self, ty: VarType, slot: u32) -> Result<Data, ContextError> {
        self.locals.get(ty, slot)
    }

    fn set_local(&mut self, ty: VarType, slot: u32, value: Data) -> Result<(), ContextError> {
        self.locals.set(ty, slot, value)
    }

    fn get_global(&self, name: &str, ty: VarType) -> Result<Data, ContextError> {
        self.global(name)
            .map(|v| narrow(ty, v))
            .ok_or_else(|| ContextError::UnknownGlobal(name.to_string()))
    }

    fn set_global(&mut self, name: &str, _ty: VarType, value: Data) -> Result<(), ContextError> {
        let (declared, slot) = self
            .globals
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| ContextError::UnknownGlobal(name.to_string()))?;
        *slot = narrow(*declared, value);
        Ok(())
    }

    fn get_member(&self, object: &str, name: &str, ty: VarType) -> Result<Data, ContextError> {
        self.member(object, name)
            .map(|v| narrow(ty, v))
            .ok_or_else(|| ContextError::UnknownMember {
                object: object.to_string(),
                name: name.to_string(),
            })
    }

    fn set_member(
        &mut self,
        object: &str,
        name: &str,
        _ty: VarType,
        value: Data,
    ) -> Result<(), ContextError> {
        let key = (object.to_lowercase(), name.to_lowercase());
        let (declared, slot) =
            self.members
                .get_mut(&key)
                .ok_or_else(|| ContextError::UnknownMember {
                    object: object.to_string(),
                    name: name.to_string(),
                })?;
        *slot = narrow(*declared, value);
        Ok(())
    }

    fn start_script(&mut self, name: &str) {
        self.running.insert(name.to_lowercase());
    }

    fn stop_script(&mut self, name: &str) {
        self.running.remove(&name.to_lowercase());
    }

    fn is_script_running(&self, name: &str) -> bool {
        self.running.contains(&name.to_lowercase())
    }
}
