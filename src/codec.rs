// 原始位图(DIB)载荷转PNG编码

use std::io::Cursor;

use image::{ImageError, ImageFormat};

use crate::error::{IconError, Result};
use crate::ico::build_ico;
use crate::types::{IconVariant, VariantFormat};

// BITMAPINFOHEADER 中宽、高、位深的固定偏移
const DIB_WIDTH_OFFSET: usize = 4;
const DIB_HEIGHT_OFFSET: usize = 8;
const DIB_BIT_COUNT_OFFSET: usize = 14;
const DIB_HEADER_MIN_LEN: usize = 16;

/// 把RT_ICON的原始DIB载荷编码为PNG字节流。
///
/// 载荷先包装成单条目ICO再交给图像解码器（裸DIB没有独立的解码入口），
/// 解码结果统一转RGBA后重新编码为PNG。1位单色图标是已知不支持的情况，
/// 在解码前就拒绝。
pub fn encode_raw_icon_to_png(payload: &[u8], monochrome: bool) -> Result<Vec<u8>> {
    if monochrome {
        return Err(IconError::UnsupportedPixelFormat { bits_per_pixel: 1 });
    }

    if payload.len() < DIB_HEADER_MIN_LEN {
        return Err(IconError::EncodeFailed {
            reason: format!("DIB头不完整（{}字节）", payload.len()),
        });
    }

    let width = i32::from_le_bytes([
        payload[DIB_WIDTH_OFFSET],
        payload[DIB_WIDTH_OFFSET + 1],
        payload[DIB_WIDTH_OFFSET + 2],
        payload[DIB_WIDTH_OFFSET + 3],
    ]);
    // DIB高度包含XOR和AND两个掩码，是实际高度的两倍
    let height = i32::from_le_bytes([
        payload[DIB_HEIGHT_OFFSET],
        payload[DIB_HEIGHT_OFFSET + 1],
        payload[DIB_HEIGHT_OFFSET + 2],
        payload[DIB_HEIGHT_OFFSET + 3],
    ])
    .unsigned_abs()
        / 2;
    let bit_count = u16::from_le_bytes([
        payload[DIB_BIT_COUNT_OFFSET],
        payload[DIB_BIT_COUNT_OFFSET + 1],
    ]);

    if bit_count == 1 {
        return Err(IconError::UnsupportedPixelFormat { bits_per_pixel: 1 });
    }

    let wrapper = IconVariant {
        format: VariantFormat::RawBitmap,
        width: width.unsigned_abs(),
        height,
        color_count: 0,
        planes: 1,
        bits_per_pixel: bit_count,
        payload_size: payload.len() as u32,
        resource_id: 0,
        payload: Some(payload.to_vec()),
    };
    let ico_bytes = build_ico(std::slice::from_ref(&wrapper))?;

    let decoded = image::load(Cursor::new(&ico_bytes), ImageFormat::Ico)
        .map_err(|e| translate_codec_error(e, bit_count))?;

    let mut png_data = Vec::new();
    decoded
        .to_rgba8()
        .write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)
        .map_err(|e| IconError::EncodeFailed {
            reason: e.to_string(),
        })?;

    Ok(png_data)
}

// 把图像库的错误码翻译成可读的错误原因
fn translate_codec_error(error: ImageError, bit_count: u16) -> IconError {
    match error {
        ImageError::Unsupported(_) => IconError::UnsupportedPixelFormat {
            bits_per_pixel: bit_count,
        },
        ImageError::Limits(e) => IconError::CodecInitRequired {
            reason: e.to_string(),
        },
        other => IconError::EncodeFailed {
            reason: other.to_string(),
        },
    }
}
