//! Configuration management
//!
//! 配置在启动时从 TOML 文件和环境变量加载一次，
//! 之后以 `Arc<StaticConfig>` / `Arc<AttributionConfig>` 的形式显式传入各组件。

mod structs;

pub use structs::*;
