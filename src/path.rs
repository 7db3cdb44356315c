// 路径处理模块

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IconError, Result};

/// 拆分源模块路径，返回（主文件名，扩展名）
pub fn split_source_path(file_path: &str) -> (String, String) {
    let path = Path::new(file_path);
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (base, ext)
}

// 规范文件名：<源文件名>-<源扩展名>-<组序号>-<宽>x<高>.<目标扩展名>
fn canonical_file_name(
    base_name: &str,
    source_ext: &str,
    group_index: usize,
    width: u32,
    height: u32,
    target_ext: &str,
) -> String {
    format!(
        "{}-{}-{}-{}x{}.{}",
        base_name, source_ext, group_index, width, height, target_ext
    )
}

/// 把用户给出的输出路径解析为最终可写路径。
///
/// 解析顺序：空字符串 → 当前目录 + 规范文件名；已存在的目录 → 该目录 +
/// 规范文件名；没有扩展名的路径 → 视为待创建目录 + 规范文件名；其余情况
/// 原样使用。解析后确保父目录存在，并校验扩展名与目标格式一致。
pub fn resolve_output_path(
    base_name: &str,
    source_ext: &str,
    group_index: usize,
    width: u32,
    height: u32,
    target_ext: &str,
    user_path: &str,
) -> Result<PathBuf> {
    let file_name = canonical_file_name(
        base_name,
        source_ext,
        group_index,
        width,
        height,
        target_ext,
    );

    let resolved = if user_path.is_empty() {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(file_name)
    } else {
        let path = Path::new(user_path);
        if path.is_dir() {
            path.join(file_name)
        } else if path.extension().is_none() {
            // 尚未创建的目录
            path.join(file_name)
        } else {
            path.to_path_buf()
        }
    };

    if let Some(parent) = resolved.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| IconError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let extension_matches = resolved
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(target_ext))
        .unwrap_or(false);
    if !extension_matches {
        return Err(IconError::ExtensionMismatch {
            expected: target_ext.to_string(),
            path: resolved,
        });
    }

    Ok(resolved)
}
