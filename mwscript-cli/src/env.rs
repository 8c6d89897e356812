//! 环境文件
//!
//! JSON 描述脚本所见的宿主世界：全局变量、引用 id、成员变量、
//! 默认对象以及是否允许声明局部变量。
//!
//! ```json
//! {
//!   "owner": "player",
//!   "globals": [{ "name": "GameHour", "type": "float", "value": 9.5 }],
//!   "ids": ["player"],
//!   "members": [{ "object": "guard", "name": "alarm", "type": "long", "value": 0 }],
//!   "locals_allowed": true
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use mwscript_core::{Data, MemoryContext, StaticCompilerContext, VarType};

use crate::error::CliError;

const DEFAULT_OWNER: &str = "player";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Environment {
    /// 隐式引用指令作用的对象
    pub owner: String,
    pub globals: Vec<VariableDecl>,
    pub ids: Vec<String>,
    pub members: Vec<MemberDecl>,
    pub locals_allowed: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            globals: Vec::new(),
            ids: Vec::new(),
            members: Vec::new(),
            locals_allowed: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: VarType,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDecl {
    pub object: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: VarType,
    #[serde(default)]
    pub value: f64,
}

fn initial(ty: VarType, value: f64) -> Data {
    match ty {
        VarType::Float => Data::Float(value as f32),
        VarType::Short | VarType::Long => Data::Integer(value as i32),
    }
}

impl Environment {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::Environment {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 编译期可见的名字
    pub fn compiler_context(&self) -> StaticCompilerContext {
        let mut context = StaticCompilerContext::new().with_id(&self.owner);
        for id in &self.ids {
            context = context.with_id(id);
        }
        for global in &self.globals {
            context = context.with_global(&global.name, global.ty);
        }
        for member in &self.members {
            context = context.with_member(&member.object, &member.name, member.ty);
        }
        if !self.locals_allowed {
            context = context.forbid_locals();
        }
        context
    }

    /// 在运行前写入全局与成员变量的初值
    pub fn prepare(&self, context: &mut MemoryContext) {
        for global in &self.globals {
            context.define_global(&global.name, global.ty, initial(global.ty, global.value));
        }
        for member in &self.members {
            context.define_member(
                &member.object,
                &member.name,
                member.ty,
                initial(member.ty, member.value),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwscript_core::CompilerContext;

    #[test]
    fn test_parse_environment() {
        let env: Environment = serde_json::from_str(
            r#"{
                "globals": [{ "name": "GameHour", "type": "float", "value": 9.5 }],
                "members": [{ "object": "Guard", "name": "Alarm", "type": "short" }]
            }"#,
        )
        .unwrap();
        assert_eq!(env.owner, "player");
        assert!(env.locals_allowed);

        let context = env.compiler_context();
        assert_eq!(context.global_type("gamehour"), Some(VarType::Float));
        assert_eq!(context.member_type("alarm", "guard"), Some(VarType::Short));
        assert!(context.is_id("player"));

        let mut memory = MemoryContext::default();
        env.prepare(&mut memory);
        assert_eq!(memory.global("GameHour"), Some(Data::Float(9.5)));
        assert_eq!(memory.member("guard", "alarm"), Some(Data::Integer(0)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<Environment>(r#"{ "global": [] }"#).is_err());
    }

    #[test]
    fn test_forbid_locals() {
        let env: Environment = serde_json::from_str(r#"{ "locals_allowed": false }"#).unwrap();
        assert!(!env.compiler_context().can_declare_locals());
    }
}
