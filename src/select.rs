// 最佳图标选择

use crate::error::{IconError, Result};
use crate::types::IconVariant;

/// 从条目集合中选出"最大/最佳"的图标。
///
/// 选择规则：
/// 1. 归一化面积更大（更高分辨率）优先
/// 2. 面积相同时，位深度更高优先
/// 3. 仍然相同时保留先出现的条目（目录顺序）
pub fn select_best(variants: &[IconVariant]) -> Result<&IconVariant> {
    let mut iter = variants.iter();
    let mut best = iter.next().ok_or(IconError::EmptyVariantSet)?;

    for candidate in iter {
        let is_better = candidate.normalized_area() > best.normalized_area()
            || (candidate.normalized_area() == best.normalized_area()
                && candidate.bits_per_pixel > best.bits_per_pixel);
        if is_better {
            best = candidate;
        }
    }

    Ok(best)
}
