// 提取流程编排与对外操作接口

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, warn};

use crate::codec::encode_raw_icon_to_png;
use crate::error::{IconError, Result};
use crate::group::parse_group;
use crate::ico::build_ico;
use crate::loader::ModuleResources;
use crate::path::{resolve_output_path, split_source_path};
use crate::select::select_best;
use crate::types::{IconGroup, IconVariant, ResourceId, VariantFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Ico,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ico => "ico",
            OutputFormat::Png => "png",
        }
    }
}

/// 把指定图标组的全部条目打包保存为一个多分辨率ICO文件，返回最终路径。
/// `group_index` 从1开始；`output_path` 为空时写入当前目录。
pub fn save_group_to_ico(
    file_path: &str,
    group_index: usize,
    output_path: &str,
) -> Result<PathBuf> {
    save_single_group(file_path, group_index, output_path, OutputFormat::Ico)
}

/// 把指定图标组中最佳的一个条目保存为PNG文件，返回最终路径。
/// PNG压缩的条目原样落盘，原始位图条目经编码器转换。
pub fn save_group_to_png(
    file_path: &str,
    group_index: usize,
    output_path: &str,
) -> Result<PathBuf> {
    save_single_group(file_path, group_index, output_path, OutputFormat::Png)
}

/// 把模块中所有图标组保存为ICO，逐组尽力而为，返回成功的路径列表
pub fn save_all_groups_to_ico(file_path: &str, output_dir: &str) -> Result<Vec<PathBuf>> {
    save_all_groups(file_path, output_dir, OutputFormat::Ico)
}

/// 把模块中所有图标组保存为PNG，逐组尽力而为，返回成功的路径列表
pub fn save_all_groups_to_png(file_path: &str, output_dir: &str) -> Result<Vec<PathBuf>> {
    save_all_groups(file_path, output_dir, OutputFormat::Png)
}

/// 列出模块中全部图标组的资源标识
pub fn list_group_identifiers(file_path: &str) -> Result<Vec<ResourceId>> {
    let resources = ModuleResources::open(file_path)?;
    resources.group_ids()
}

/// 按资源标识列出一个图标组的全部条目；`include_payload` 控制是否取回载荷
pub fn list_variants(
    file_path: &str,
    identifier: &ResourceId,
    include_payload: bool,
) -> Result<Vec<IconVariant>> {
    let resources = ModuleResources::open(file_path)?;
    load_variants(&resources, identifier, include_payload)
}

/// 模块中图标组的数量
pub fn count_groups(file_path: &str) -> Result<usize> {
    Ok(list_group_identifiers(file_path)?.len())
}

/// 指定图标组（按序号）中的条目数量
pub fn count_variants(file_path: &str, group_index: usize) -> Result<usize> {
    let resources = ModuleResources::open(file_path)?;
    let ids = resources.group_ids()?;
    let group = load_group(&resources, &ids, group_index, false)?;
    Ok(group.variants.len())
}

fn load_variants(
    resources: &ModuleResources,
    identifier: &ResourceId,
    include_payload: bool,
) -> Result<Vec<IconVariant>> {
    let group_data = resources.group_data(identifier)?;
    parse_group(&group_data, |icon_id| {
        if include_payload {
            resources.icon_data(icon_id).map(Some)
        } else {
            Ok(None)
        }
    })
}

// 按序号装配一个图标组；序号必须在 [1, 组数] 内
fn load_group(
    resources: &ModuleResources,
    ids: &[ResourceId],
    group_index: usize,
    include_payload: bool,
) -> Result<IconGroup> {
    if group_index == 0 || group_index > ids.len() {
        return Err(IconError::InvalidGroupIndex {
            index: group_index,
            count: ids.len(),
        });
    }
    let identifier = ids[group_index - 1].clone();
    let variants = load_variants(resources, &identifier, include_payload)?;
    Ok(IconGroup {
        identifier,
        group_index,
        variants,
    })
}

fn save_single_group(
    file_path: &str,
    group_index: usize,
    output_path: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let start = Instant::now();
    debug!("开始提取图标组: {} (组 {})", file_path, group_index);

    let resources = ModuleResources::open(file_path)?;
    let ids = resources.group_ids()?;
    let result = save_group(&resources, &ids, group_index, output_path, format);

    match &result {
        Ok(path) => debug!(
            "提取成功: {} -> {} (耗时 {:.3}s)",
            file_path,
            path.display(),
            start.elapsed().as_secs_f64()
        ),
        Err(e) => debug!(
            "提取失败: {} (组 {}): {} (耗时 {:.3}s)",
            file_path,
            group_index,
            e,
            start.elapsed().as_secs_f64()
        ),
    }

    result
}

fn save_group(
    resources: &ModuleResources,
    ids: &[ResourceId],
    group_index: usize,
    output_path: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let group = load_group(resources, ids, group_index, true)?;
    let (base_name, source_ext) = split_source_path(resources.path());

    let (bytes, width, height) = match format {
        OutputFormat::Ico => {
            // 文件名取打包条目中最大的一个，文件本身仍包含全部条目
            let largest = select_best(&group.variants)?;
            let (w, h) = (largest.normalized_width(), largest.normalized_height());
            (build_ico(&group.variants)?, w, h)
        }
        OutputFormat::Png => {
            let best = select_best(&group.variants)?;
            let payload = best
                .payload
                .as_deref()
                .ok_or(IconError::MissingPayload {
                    resource_id: best.resource_id,
                })?;
            let bytes = match best.format {
                VariantFormat::Png => payload.to_vec(),
                VariantFormat::RawBitmap => {
                    encode_raw_icon_to_png(payload, best.bits_per_pixel == 1)?
                }
            };
            (bytes, best.normalized_width(), best.normalized_height())
        }
    };

    let final_path = resolve_output_path(
        &base_name,
        &source_ext,
        group_index,
        width,
        height,
        format.extension(),
        output_path,
    )?;

    fs::write(&final_path, &bytes).map_err(|e| IconError::FileWriteFailed {
        path: final_path.clone(),
        source: e,
    })?;

    Ok(final_path)
}

// 批量提取：逐组尽力而为，单组失败记录后继续，全部失败才报错
fn save_all_groups(
    file_path: &str,
    output_dir: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    let resources = ModuleResources::open(file_path)?;
    let ids = resources.group_ids()?;

    let mut saved = Vec::new();
    let mut last_error: Option<IconError> = None;

    for group_index in 1..=ids.len() {
        match save_group(&resources, &ids, group_index, output_dir, format) {
            Ok(path) => saved.push(path),
            Err(e) => {
                warn!(
                    "图标组 {} ({}) 提取失败: {}",
                    group_index,
                    ids[group_index - 1],
                    e
                );
                last_error = Some(e);
            }
        }
    }

    if saved.is_empty() {
        return Err(IconError::NoGroupsExtracted {
            path: file_path.to_string(),
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        });
    }

    debug!(
        "批量提取完成: {} ({}/{} 组, 耗时 {:.3}s)",
        file_path,
        saved.len(),
        ids.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(saved)
}
