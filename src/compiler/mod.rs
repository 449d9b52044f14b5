//! 编译模块：将原始指纹规则编译为可执行的正则模式
pub mod compiler;
pub mod pattern;

pub use self::compiler::{
    CatalogCompiler, CompiledCatalog, CompiledDomRule, CompiledFingerprint, ImpliedTech,
};
pub use self::pattern::CompiledPattern;
