//! 标准扩展集
//!
//! 注册常用的脚本控制与对话指令名字及固定操作码。处理函数大多由宿主安装；
//! 脚本控制类（StartScript / StopScript / ScriptRunning）可用
//! [`install_script_control`] 安装通用实现，它们经由运行时上下文的钩子工作。

use super::registry::{Extensions, RegistryError};
use crate::types::ValueType;

/// 标准扩展的操作码
pub mod codes {
    use crate::bytecode::Opcode;

    pub const ADD_TOPIC: Opcode = Opcode::segment4(0x100);
    pub const START_SCRIPT: Opcode = Opcode::segment4(0x101);
    pub const STOP_SCRIPT: Opcode = Opcode::segment4(0x102);
    pub const SCRIPT_RUNNING: Opcode = Opcode::segment4(0x103);
    pub const ON_ACTIVATE: Opcode = Opcode::segment4(0x104);
    pub const ON_ACTIVATE_EXPLICIT: Opcode = Opcode::segment4(0x105);
    pub const GET_HEALTH: Opcode = Opcode::segment4(0x106);
    pub const GET_HEALTH_EXPLICIT: Opcode = Opcode::segment4(0x107);
    pub const SET_HEALTH: Opcode = Opcode::segment4(0x108);
    pub const SET_HEALTH_EXPLICIT: Opcode = Opcode::segment4(0x109);
    pub const MOD_HEALTH: Opcode = Opcode::segment4(0x10a);
    pub const MOD_HEALTH_EXPLICIT: Opcode = Opcode::segment4(0x10b);
    pub const GET_SCALE: Opcode = Opcode::segment4(0x10c);
    pub const GET_SCALE_EXPLICIT: Opcode = Opcode::segment4(0x10d);
    pub const SET_SCALE: Opcode = Opcode::segment4(0x10e);
    pub const SET_SCALE_EXPLICIT: Opcode = Opcode::segment4(0x10f);
    pub const JOURNAL: Opcode = Opcode::segment4(0x110);
    pub const MESSAGE_BOX: Opcode = Opcode::segment3(0x100);
}

/// 注册标准扩展名字
pub fn register_standard(extensions: &mut Extensions) -> Result<(), RegistryError> {
    use codes::*;

    extensions.register_instruction("AddTopic", "S", ADD_TOPIC, None)?;
    extensions.register_instruction("StartScript", "c", START_SCRIPT, None)?;
    extensions.register_instruction("StopScript", "c", STOP_SCRIPT, None)?;
    extensions.register_function("ScriptRunning", ValueType::Integer, "c", SCRIPT_RUNNING, None)?;
    extensions.register_function(
        "OnActivate",
        ValueType::Integer,
        "",
        ON_ACTIVATE,
        Some(ON_ACTIVATE_EXPLICIT),
    )?;
    extensions.register_function(
        "GetHealth",
        ValueType::Float,
        "",
        GET_HEALTH,
        Some(GET_HEALTH_EXPLICIT),
    )?;
    extensions.register_instruction("SetHealth", "f", SET_HEALTH, Some(SET_HEALTH_EXPLICIT))?;
    extensions.register_instruction("ModHealth", "f", MOD_HEALTH, Some(MOD_HEALTH_EXPLICIT))?;
    extensions.register_function(
        "GetScale",
        ValueType::Float,
        "",
        GET_SCALE,
        Some(GET_SCALE_EXPLICIT),
    )?;
    extensions.register_instruction("SetScale", "f", SET_SCALE, Some(SET_SCALE_EXPLICIT))?;
    extensions.register_instruction("Journal", "cl", JOURNAL, None)?;
    extensions.register_instruction("MessageBox", "S/fffffffff", MESSAGE_BOX, None)?;
    Ok(())
}

/// 安装脚本控制类处理函数
pub fn install_script_control(extensions: &mut Extensions) -> Result<(), RegistryError> {
    extensions.install(codes::START_SCRIPT, |runtime, _| {
        let name = runtime.pop_string()?;
        runtime.context().start_script(name);
        Ok(())
    })?;

    extensions.install(codes::STOP_SCRIPT, |runtime, _| {
        let name = runtime.pop_string()?;
        runtime.context().stop_script(name);
        // 停止自身：当前这次运行也随之结束
        if name.to_lowercase() == runtime.script_name().to_lowercase() {
            runtime.stop();
        }
        Ok(())
    })?;

    extensions.install(codes::SCRIPT_RUNNING, |runtime, _| {
        let name = runtime.pop_string()?;
        let running = runtime.context().is_script_running(name);
        runtime.push_integer(i32::from(running))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        let mut ext = Extensions::new();
        register_standard(&mut ext).unwrap();
        assert_eq!(ext.lookup("addtopic").map(|e| e.code), Some(codes::ADD_TOPIC));
        assert_eq!(
            ext.lookup("SetHealth").and_then(|e| e.explicit_code),
            Some(codes::SET_HEALTH_EXPLICIT)
        );
        assert!(ext.lookup("MessageBox").unwrap().signature.has_optional());
        assert_eq!(ext.len(), 12);
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut ext = Extensions::new();
        register_standard(&mut ext).unwrap();
        assert!(register_standard(&mut ext).is_err());
    }

    #[test]
    fn test_script_control_handlers_installed() {
        let mut ext = Extensions::new();
        install_script_control(&mut ext).unwrap();
        assert!(ext.handler(codes::STOP_SCRIPT).is_some());
        assert!(ext.handler(codes::ADD_TOPIC).is_none());
    }
}
