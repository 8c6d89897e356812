//! 宿主扩展：名字注册、参数签名与处理函数

pub mod registry;
pub mod signature;
pub mod standard;

pub use registry::{Extension, ExtensionKind, Extensions, Handler, RegistryError};
pub use signature::{ArgKind, Signature, SignatureError};
pub use standard::{codes, install_script_control, register_standard};
