// 图标组目录解析

use crate::constants::{
    GROUP_DIR_SIZE, GROUP_ENTRY_SIZE, ICON_RESOURCE_TYPE, PNG_HEADER_MIN_LEN,
};
use crate::error::{IconError, Result};
use crate::types::{is_png_payload, IconVariant, VariantFormat};

// 定长字段读取，读取前做边界检查，不做内存结构覆盖
fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// 解析图标组目录缓冲区，返回目录顺序的图标条目序列。
///
/// `fetch_payload` 按资源ID取回载荷字节；返回 `Ok(None)` 表示本次只要元数据。
/// 载荷前4字节为PNG签名时条目标记为 [`VariantFormat::Png`]，且当载荷长度足以
/// 覆盖IHDR块时用其中的真实宽高覆盖目录声明的宽高。
pub fn parse_group<F>(group_data: &[u8], mut fetch_payload: F) -> Result<Vec<IconVariant>>
where
    F: FnMut(u16) -> Result<Option<Vec<u8>>>,
{
    let malformed = || IconError::MalformedGroupHeader {
        len: group_data.len(),
    };

    if group_data.len() < GROUP_DIR_SIZE {
        return Err(malformed());
    }

    // 头部：保留(2，忽略) + 类型(2，必须为1) + 数量(2)
    let resource_type = read_u16_le(group_data, 2).ok_or_else(malformed)?;
    if resource_type != ICON_RESOURCE_TYPE {
        return Err(IconError::UnsupportedResourceType {
            found: resource_type,
        });
    }
    let count = read_u16_le(group_data, 4).ok_or_else(malformed)?;
    if count == 0 {
        return Err(IconError::EmptyIconGroup);
    }

    let mut variants = Vec::with_capacity(count as usize);

    for i in 0..count as usize {
        let entry_offset = GROUP_DIR_SIZE + i * GROUP_ENTRY_SIZE;
        if entry_offset + GROUP_ENTRY_SIZE > group_data.len() {
            // 声明的条目数超出缓冲区，视为损坏而不是截断返回
            return Err(malformed());
        }

        let entry = group_data
            .get(entry_offset..entry_offset + GROUP_ENTRY_SIZE)
            .ok_or_else(malformed)?;

        let mut width = entry[0] as u32;
        let mut height = entry[1] as u32;
        let color_count = entry[2];
        // entry[3] 为保留字段
        let planes = read_u16_le(entry, 4).ok_or_else(malformed)?;
        let bits_per_pixel = read_u16_le(entry, 6).ok_or_else(malformed)?;
        let payload_size = read_u32_le(entry, 8).ok_or_else(malformed)?;
        let resource_id = read_u16_le(entry, 12).ok_or_else(malformed)?;

        let payload = fetch_payload(resource_id)?;

        let mut format = VariantFormat::RawBitmap;
        if let Some(ref bytes) = payload {
            if is_png_payload(bytes) {
                format = VariantFormat::Png;
                // IHDR块中的真实宽高（大端，固定偏移16/20）
                if bytes.len() >= PNG_HEADER_MIN_LEN {
                    if let (Some(w), Some(h)) = (read_u32_be(bytes, 16), read_u32_be(bytes, 20)) {
                        width = w;
                        height = h;
                    }
                }
            }
        }

        variants.push(IconVariant {
            format,
            width,
            height,
            color_count,
            planes,
            bits_per_pixel,
            payload_size,
            resource_id,
            payload,
        });
    }

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 组头 + 若干14字节条目
    fn group_buffer(resource_type: u16, entries: &[[u8; 14]]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&resource_type.to_le_bytes());
        buf.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for entry in entries {
            buf.extend_from_slice(entry);
        }
        buf
    }

    fn entry(
        width: u8,
        height: u8,
        color_count: u8,
        bits_per_pixel: u16,
        payload_size: u32,
        resource_id: u16,
    ) -> [u8; 14] {
        let mut e = [0u8; 14];
        e[0] = width;
        e[1] = height;
        e[2] = color_count;
        e[4..6].copy_from_slice(&1u16.to_le_bytes());
        e[6..8].copy_from_slice(&bits_per_pixel.to_le_bytes());
        e[8..12].copy_from_slice(&payload_size.to_le_bytes());
        e[12..14].copy_from_slice(&resource_id.to_le_bytes());
        e
    }

    fn no_payload(_id: u16) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    // 带IHDR尺寸的伪PNG载荷
    fn png_payload(width: u32, height: u32) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(b"\x89PNG\r\n\x1a\n");
        p.extend_from_slice(&13u32.to_be_bytes());
        p.extend_from_slice(b"IHDR");
        p.extend_from_slice(&width.to_be_bytes());
        p.extend_from_slice(&height.to_be_bytes());
        p
    }

    #[test]
    fn test_parse_entries_verbatim_in_order() {
        let buf = group_buffer(
            1,
            &[
                entry(16, 16, 16, 4, 744, 1),
                entry(32, 32, 0, 8, 2216, 2),
                entry(0, 0, 0, 32, 270398, 3),
            ],
        );
        let variants = parse_group(&buf, no_payload).unwrap();
        assert_eq!(variants.len(), 3);

        assert_eq!(variants[0].width, 16);
        assert_eq!(variants[0].color_count, 16);
        assert_eq!(variants[0].bits_per_pixel, 4);
        assert_eq!(variants[0].payload_size, 744);
        assert_eq!(variants[0].resource_id, 1);
        assert_eq!(variants[0].planes, 1);
        assert_eq!(variants[0].format, VariantFormat::RawBitmap);

        // 0 保持原样，不在解析时归一化
        assert_eq!(variants[2].width, 0);
        assert_eq!(variants[2].height, 0);
        assert_eq!(variants[2].normalized_width(), 256);
        assert_eq!(variants[2].resource_id, 3);
    }

    #[test]
    fn test_parse_rejects_short_header() {
        let err = parse_group(&[0, 0, 1, 0], no_payload).unwrap_err();
        assert!(matches!(err, IconError::MalformedGroupHeader { len: 4 }));
    }

    #[test]
    fn test_parse_rejects_cursor_type() {
        let buf = group_buffer(2, &[entry(32, 32, 0, 32, 100, 1)]);
        let err = parse_group(&buf, no_payload).unwrap_err();
        assert!(matches!(
            err,
            IconError::UnsupportedResourceType { found: 2 }
        ));
    }

    #[test]
    fn test_parse_rejects_empty_group() {
        let buf = group_buffer(1, &[]);
        let err = parse_group(&buf, no_payload).unwrap_err();
        assert!(matches!(err, IconError::EmptyIconGroup));
    }

    #[test]
    fn test_parse_rejects_truncated_entries() {
        let mut buf = group_buffer(1, &[entry(32, 32, 0, 32, 100, 1)]);
        // 声明2个条目但只有1个
        buf[4] = 2;
        let err = parse_group(&buf, no_payload).unwrap_err();
        assert!(matches!(err, IconError::MalformedGroupHeader { .. }));
    }

    #[test]
    fn test_png_payload_overrides_dimensions() {
        let buf = group_buffer(1, &[entry(0, 0, 0, 32, 1000, 7)]);
        let payload = png_payload(512, 512);
        let variants = parse_group(&buf, |id| {
            assert_eq!(id, 7);
            Ok(Some(payload.clone()))
        })
        .unwrap();

        assert_eq!(variants[0].format, VariantFormat::Png);
        assert_eq!(variants[0].width, 512);
        assert_eq!(variants[0].height, 512);
    }

    #[test]
    fn test_short_png_payload_keeps_declared_dimensions() {
        // 签名命中即判定为PNG，但不足24字节时不覆盖尺寸
        let buf = group_buffer(1, &[entry(48, 48, 0, 32, 8, 7)]);
        let variants =
            parse_group(&buf, |_| Ok(Some(b"\x89PNG\r\n\x1a\n".to_vec()))).unwrap();

        assert_eq!(variants[0].format, VariantFormat::Png);
        assert_eq!(variants[0].width, 48);
        assert_eq!(variants[0].height, 48);
    }

    #[test]
    fn test_non_png_payload_stays_raw_bitmap() {
        let buf = group_buffer(1, &[entry(32, 32, 0, 32, 4, 9)]);
        let variants = parse_group(&buf, |_| Ok(Some(vec![0x28, 0, 0, 0]))).unwrap();

        assert_eq!(variants[0].format, VariantFormat::RawBitmap);
        assert_eq!(variants[0].width, 32);
        assert_eq!(variants[0].payload.as_deref(), Some(&[0x28, 0, 0, 0][..]));
    }
}
