//! 编译期上下文：全局变量、成员变量与引用 id 的查询

use std::collections::{HashMap, HashSet};

use crate::types::VarType;

/// 宿主提供给编译器的名字信息；名字一律以小写传入
pub trait CompilerContext {
    /// 全局变量的类型
    fn global_type(&self, name: &str) -> Option<VarType>;

    /// `object->name` 成员变量的类型
    fn member_type(&self, name: &str, object: &str) -> Option<VarType>;

    /// `name` 是否为已知的对象引用 id
    fn is_id(&self, name: &str) -> bool;

    /// 当前脚本能否声明局部变量
    fn can_declare_locals(&self) -> bool {
        true
    }
}

/// 基于表的编译期上下文
#[derive(Debug, Clone, Default)]
pub struct StaticCompilerContext {
    globals: HashMap<String, VarType>,
    ids: HashSet<String>,
    members: HashMap<(String, String), VarType>,
    forbid_locals: bool,
}

impl StaticCompilerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, name: &str, ty: VarType) -> Self {
        self.globals.insert(name.to_lowercase(), ty);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.ids.insert(id.to_lowercase());
        self
    }

    /// 声明成员变量，同时把对象登记为引用 id
    pub fn with_member(mut self, object: &str, name: &str, ty: VarType) -> Self {
        let object = object.to_lowercase();
        self.ids.insert(object.clone());
        self.members.insert((object, name.to_lowercase()), ty);
        self
    }

    pub fn forbid_locals(mut self) -> Self {
        self.forbid_locals = true;
        self
    }
}

impl CompilerContext for StaticCompilerContext {
    fn global_type(&self, name: &str) -> Option<VarType> {
        self.globals.get(&name.to_lowercase()).copied()
    }

    fn member_type(&self, name: &str, object: &str) -> Option<VarType> {
        self.members
            .get(&(object.to_lowercase(), name.to_lowercase()))
            .copied()
    }

    fn is_id(&self, name: &str) -> bool {
        self.ids.contains(&name.to_lowercase())
    }

    fn can_declare_locals(&self) -> bool {
        !self.forbid_locals
    }
}
