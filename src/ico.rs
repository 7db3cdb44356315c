// ICO容器序列化

use crate::constants::{ICO_DIR_SIZE, ICO_ENTRY_SIZE, ICON_RESOURCE_TYPE};
use crate::error::{IconError, Result};
use crate::types::IconVariant;

/// 把带载荷的图标条目按输入顺序组装成一个多分辨率ICO字节流。
///
/// 目录条目写入的是未归一化的原始字段；宽高只取低字节，256因此落回
/// ICO约定的0。载荷字节原样拷贝，不区分PNG与DIB。
pub fn build_ico(variants: &[IconVariant]) -> Result<Vec<u8>> {
    if variants.is_empty() {
        return Err(IconError::EmptyVariantSet);
    }

    let mut ico = Vec::with_capacity(
        ICO_DIR_SIZE
            + variants.len() * ICO_ENTRY_SIZE
            + variants
                .iter()
                .map(|v| v.payload_size as usize)
                .sum::<usize>(),
    );

    // ICONDIR 头：保留(2) + 类型(2) + 数量(2)
    ico.extend_from_slice(&0u16.to_le_bytes());
    ico.extend_from_slice(&ICON_RESOURCE_TYPE.to_le_bytes());
    ico.extend_from_slice(&(variants.len() as u16).to_le_bytes());

    // 载荷块从头部和目录之后开始，按同一顺序累计偏移
    let mut data_offset = (ICO_DIR_SIZE + variants.len() * ICO_ENTRY_SIZE) as u32;

    for variant in variants {
        let payload = variant
            .payload
            .as_ref()
            .ok_or(IconError::MissingPayload {
                resource_id: variant.resource_id,
            })?;

        ico.push((variant.width & 0xFF) as u8);
        ico.push((variant.height & 0xFF) as u8);
        ico.push(variant.color_count);
        ico.push(0); // 保留字段
        ico.extend_from_slice(&variant.planes.to_le_bytes());
        ico.extend_from_slice(&variant.bits_per_pixel.to_le_bytes());
        ico.extend_from_slice(&variant.payload_size.to_le_bytes());
        ico.extend_from_slice(&data_offset.to_le_bytes());

        data_offset += payload.len() as u32;
    }

    for variant in variants {
        if let Some(ref payload) = variant.payload {
            ico.extend_from_slice(payload);
        }
    }

    Ok(ico)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantFormat;

    fn variant_with_payload(width: u32, height: u32, resource_id: u16, payload: Vec<u8>) -> IconVariant {
        IconVariant {
            format: VariantFormat::RawBitmap,
            width,
            height,
            color_count: 0,
            planes: 1,
            bits_per_pixel: 32,
            payload_size: payload.len() as u32,
            resource_id,
            payload: Some(payload),
        }
    }

    fn u16_at(data: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([data[offset], data[offset + 1]])
    }

    fn u32_at(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    #[test]
    fn test_round_trip_header_offsets_and_order() {
        let payloads = [vec![0xAAu8; 7], vec![0xBBu8; 13], vec![0xCCu8; 3]];
        let variants: Vec<IconVariant> = payloads
            .iter()
            .enumerate()
            .map(|(i, p)| variant_with_payload(16 << i, 16 << i, i as u16 + 1, p.clone()))
            .collect();

        let ico = build_ico(&variants).unwrap();

        // 头部
        assert_eq!(u16_at(&ico, 0), 0);
        assert_eq!(u16_at(&ico, 2), 1);
        assert_eq!(u16_at(&ico, 4), 3);

        // 每个目录条目的偏移都指向对应长度的载荷段，且拼接顺序与输入一致
        let mut expected_offset = 6 + 3 * 16;
        for (i, payload) in payloads.iter().enumerate() {
            let entry = 6 + i * 16;
            assert_eq!(u32_at(&ico, entry + 8) as usize, payload.len());
            assert_eq!(u32_at(&ico, entry + 12) as usize, expected_offset);

            let segment = &ico[expected_offset..expected_offset + payload.len()];
            assert_eq!(segment, payload.as_slice());
            expected_offset += payload.len();
        }
        assert_eq!(ico.len(), expected_offset);
    }

    #[test]
    fn test_raw_dimensions_truncate_to_low_byte() {
        // 256 写入目录时落回0
        let v = variant_with_payload(256, 256, 1, vec![1, 2, 3]);
        let ico = build_ico(&[v]).unwrap();
        assert_eq!(ico[6], 0);
        assert_eq!(ico[7], 0);
    }

    #[test]
    fn test_empty_variant_set_fails() {
        let err = build_ico(&[]).unwrap_err();
        assert!(matches!(err, IconError::EmptyVariantSet));
    }

    #[test]
    fn test_missing_payload_fails() {
        let mut v = variant_with_payload(32, 32, 5, vec![1]);
        v.payload = None;
        let err = build_ico(&[v]).unwrap_err();
        assert!(matches!(err, IconError::MissingPayload { resource_id: 5 }));
    }
}
