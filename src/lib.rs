// 模块声明

pub mod codec;
pub mod constants;
pub mod error;
#[cfg(target_os = "windows")]
mod extract;
pub mod group;
pub mod ico;
#[cfg(target_os = "windows")]
mod loader;
pub mod path;
pub mod select;
pub mod types;

// 重新导出主要的类型和函数
pub use error::{IconError, Result};
pub use group::parse_group; // 图标组目录解析
pub use ico::build_ico; // ICO容器组装
pub use select::select_best; // 最佳图标选择
pub use types::{IconGroup, IconVariant, ResourceId, VariantFormat};

// 对外操作接口（依赖Windows资源API）
#[cfg(target_os = "windows")]
pub use extract::{
    count_groups, count_variants, list_group_identifiers, list_variants, save_all_groups_to_ico,
    save_all_groups_to_png, save_group_to_ico, save_group_to_png,
};
#[cfg(target_os = "windows")]
pub use loader::ModuleResources;
