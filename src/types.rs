// 类型定义和结构体

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::PNG_SIGNATURE;

// 0 在目录条目中表示 256（仅宽高字段）
const DIMENSION_SENTINEL_VALUE: u32 = 256;

/// 图标条目的载荷格式：原始位图(DIB)或PNG压缩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantFormat {
    RawBitmap,
    Png,
}

// 图标组内的单个图标条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconVariant {
    pub format: VariantFormat,
    pub width: u32,          // 原始宽度（RawBitmap: 目录字节值，0表示256；Png: 头部真实宽度）
    pub height: u32,         // 原始高度（同上）
    pub color_count: u8,     // 调色板颜色数（>=8bpp 为0）
    pub planes: u16,         // 颜色平面数，实际恒为1
    pub bits_per_pixel: u16, // 每像素位数
    pub payload_size: u32,   // 资源载荷字节数
    pub resource_id: u16,    // RT_ICON 资源ID
    pub payload: Option<Vec<u8>>, // 载荷字节（仅请求元数据时为 None）
}

impl IconVariant {
    /// 归一化宽度：0 映射为 256
    pub fn normalized_width(&self) -> u32 {
        if self.width == 0 {
            DIMENSION_SENTINEL_VALUE
        } else {
            self.width
        }
    }

    /// 归一化高度：0 映射为 256
    pub fn normalized_height(&self) -> u32 {
        if self.height == 0 {
            DIMENSION_SENTINEL_VALUE
        } else {
            self.height
        }
    }

    // 归一化面积，用于选择最佳图标
    pub fn normalized_area(&self) -> u64 {
        self.normalized_width() as u64 * self.normalized_height() as u64
    }
}

/// 判断载荷是否为PNG压缩数据（前4字节签名）
pub fn is_png_payload(payload: &[u8]) -> bool {
    payload.len() >= PNG_SIGNATURE.len() && payload[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// 模块资源目录中图标组的标识：小整数ID或字符串名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceId {
    Id(u16),
    Name(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "#{}", id),
            ResourceId::Name(name) => write!(f, "{}", name),
        }
    }
}

// 单个图标组：每次提取请求重新构造，不缓存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconGroup {
    pub identifier: ResourceId, // 模块资源目录中的组标识
    pub group_index: usize,     // 枚举顺序中的位置（从1开始）
    pub variants: Vec<IconVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(width: u32, height: u32) -> IconVariant {
        IconVariant {
            format: VariantFormat::RawBitmap,
            width,
            height,
            color_count: 0,
            planes: 1,
            bits_per_pixel: 32,
            payload_size: 0,
            resource_id: 1,
            payload: None,
        }
    }

    #[test]
    fn test_normalize_zero_sentinel() {
        let v = variant(0, 0);
        assert_eq!(v.normalized_width(), 256);
        assert_eq!(v.normalized_height(), 256);
        assert_eq!(v.normalized_area(), 256 * 256);
    }

    #[test]
    fn test_normalize_identity() {
        for size in [1u32, 16, 48, 255] {
            let v = variant(size, size);
            assert_eq!(v.normalized_width(), size);
            assert_eq!(v.normalized_height(), size);
        }
    }

    #[test]
    fn test_png_signature_detection() {
        assert!(is_png_payload(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png_payload(b"\x89PNG\r\n\x1a\n"));
        assert!(!is_png_payload(b"BM\x00\x00"));
        assert!(!is_png_payload(&[0x89, 0x50, 0x4E])); // 不足4字节
    }

    #[test]
    fn test_resource_id_display() {
        assert_eq!(ResourceId::Id(32512).to_string(), "#32512");
        assert_eq!(ResourceId::Name("MAINICON".into()).to_string(), "MAINICON");
    }
}
