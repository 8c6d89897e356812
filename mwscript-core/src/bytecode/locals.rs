//! 局部变量表
//!
//! 每种类型一张名字表，槽位按声明顺序分配；名字以小写保存，查找大小写无关。

use serde::{Deserialize, Serialize};

use crate::types::VarType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("local variable '{0}' is already declared")]
pub struct DuplicateLocal(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locals {
    shorts: Vec<String>,
    longs: Vec<String>,
    floats: Vec<String>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明局部变量，返回槽位
    pub fn declare(&mut self, ty: VarType, name: &str) -> Result<u32, DuplicateLocal> {
        let name = name.to_lowercase();
        if self.search(&name).is_some() {
            return Err(DuplicateLocal(name));
        }
        let list = self.list_mut(ty);
        list.push(name);
        Ok((list.len() - 1) as u32)
    }

    /// 查找局部变量的类型与槽位
    pub fn search(&self, name: &str) -> Option<(VarType, u32)> {
        let name = name.to_lowercase();
        VarType::ALL.into_iter().find_map(|ty| {
            self.list(ty)
                .iter()
                .position(|n| *n == name)
                .map(|slot| (ty, slot as u32))
        })
    }

    pub fn names(&self, ty: VarType) -> &[String] {
        self.list(ty)
    }

    pub fn count(&self, ty: VarType) -> usize {
        self.list(ty).len()
    }

    pub fn is_empty(&self) -> bool {
        VarType::ALL.into_iter().all(|ty| self.count(ty) == 0)
    }

    fn list(&self, ty: VarType) -> &Vec<String> {
        match ty {
            VarType::Short => &self.shorts,
            VarType::Long => &self.longs,
            VarType::Float => &self.floats,
        }
    }

    fn list_mut(&mut self, ty: VarType) -> &mut Vec<String> {
        match ty {
            VarType::Short => &mut self.shorts,
            VarType::Long => &mut self.longs,
            VarType::Float => &mut self.floats,
        }
    }
}
