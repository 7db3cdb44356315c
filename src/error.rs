// 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 提取过程中可能出现的所有错误
#[derive(Debug, Error)]
pub enum IconError {
    #[error("无法加载PE文件: {path} ({reason})")]
    ModuleLoadFailed { path: String, reason: String },

    #[error("未找到任何图标组资源: {path}")]
    NoResourcesFound { path: String },

    #[error("资源未找到: {id}")]
    ResourceNotFound { id: String },

    #[error("无法加载资源 {id}: {reason}")]
    ResourceLoadFailed { id: String, reason: String },

    #[error("资源大小为0: {id}")]
    EmptyResource { id: String },

    #[error("图标组数据太小或不完整（{len}字节）")]
    MalformedGroupHeader { len: usize },

    #[error("不是有效的图标组资源（类型为{found}）")]
    UnsupportedResourceType { found: u16 },

    #[error("图标组中没有图标")]
    EmptyIconGroup,

    #[error("无效的图标组序号 {index}（共{count}组）")]
    InvalidGroupIndex { index: usize, count: usize },

    #[error("图标条目集合为空")]
    EmptyVariantSet,

    #[error("图标条目缺少载荷数据（资源ID {resource_id}）")]
    MissingPayload { resource_id: u16 },

    #[error("输出路径扩展名与 {expected} 不符: {path}")]
    ExtensionMismatch { expected: String, path: PathBuf },

    #[error("无法创建输出目录 {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法写入文件 {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("不支持的像素格式（{bits_per_pixel}位/像素）")]
    UnsupportedPixelFormat { bits_per_pixel: u16 },

    #[error("图像解码器不可用: {reason}")]
    CodecInitRequired { reason: String },

    #[error("PNG编码失败: {reason}")]
    EncodeFailed { reason: String },

    #[error("所有图标组都无法提取图标: {path}（最后错误: {last_error}）")]
    NoGroupsExtracted { path: String, last_error: String },
}

pub type Result<T> = std::result::Result<T, IconError>;
