// 资源加载模块 - Windows资源子系统封装

use windows::core::{BOOL, PCWSTR};
use windows::Win32::Foundation::{FreeLibrary, HMODULE};
use windows::Win32::System::LibraryLoader::{
    EnumResourceNamesW, FindResourceW, LoadLibraryExW, LoadResource, LockResource,
    SizeofResource, LOAD_LIBRARY_AS_DATAFILE, LOAD_LIBRARY_AS_IMAGE_RESOURCE,
};

use crate::constants::{RT_GROUP_ICON, RT_ICON};
use crate::error::{IconError, Result};
use crate::types::ResourceId;

// 整数ID与字符串名称共用 PCWSTR，整数ID的指针高位为0
fn with_resource_name<T>(id: &ResourceId, f: impl FnOnce(PCWSTR) -> T) -> T {
    match id {
        ResourceId::Id(n) => f(PCWSTR(*n as usize as *const u16)),
        ResourceId::Name(s) => {
            let wide: Vec<u16> = s.encode_utf16().chain(std::iter::once(0)).collect();
            f(PCWSTR(wide.as_ptr()))
        }
    }
}

/// 以数据文件方式打开的模块资源句柄。
///
/// 句柄在 `Drop` 中释放，保证包括提前失败在内的所有退出路径都会执行
/// `FreeLibrary`。
pub struct ModuleResources {
    module: HMODULE,
    path: String,
}

impl ModuleResources {
    /// 打开PE模块（不执行入口代码，仅加载资源段）
    pub fn open(file_path: &str) -> Result<Self> {
        let wide_path: Vec<u16> = file_path.encode_utf16().chain(std::iter::once(0)).collect();

        let module = unsafe {
            LoadLibraryExW(
                PCWSTR(wide_path.as_ptr()),
                None,
                LOAD_LIBRARY_AS_DATAFILE | LOAD_LIBRARY_AS_IMAGE_RESOURCE,
            )
        }
        .map_err(|e| IconError::ModuleLoadFailed {
            path: file_path.to_string(),
            reason: e.to_string(),
        })?;

        if module.is_invalid() {
            return Err(IconError::ModuleLoadFailed {
                path: file_path.to_string(),
                reason: "无效的模块句柄".to_string(),
            });
        }

        Ok(Self {
            module,
            path: file_path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 枚举模块中全部图标组的标识，保持资源目录顺序
    pub fn group_ids(&self) -> Result<Vec<ResourceId>> {
        let mut ids: Vec<ResourceId> = Vec::new();

        extern "system" fn enum_icon_groups_proc(
            _module: HMODULE,
            _type: PCWSTR,
            name: PCWSTR,
            lparam: isize,
        ) -> BOOL {
            let ids = lparam as *mut Vec<ResourceId>;
            unsafe {
                // 指针高位为0表示整数ID，否则指向宽字符串名称
                if (name.0 as usize) >> 16 == 0 {
                    (*ids).push(ResourceId::Id(name.0 as usize as u16));
                } else {
                    (*ids).push(ResourceId::Name(name.to_string().unwrap_or_default()));
                }
            }
            BOOL::from(true) // 继续枚举所有图标组
        }

        unsafe {
            let _ = EnumResourceNamesW(
                Some(self.module),
                PCWSTR(RT_GROUP_ICON as usize as *const u16),
                Some(enum_icon_groups_proc),
                &mut ids as *mut Vec<ResourceId> as isize,
            );
        }

        if ids.is_empty() {
            return Err(IconError::NoResourcesFound {
                path: self.path.clone(),
            });
        }

        Ok(ids)
    }

    /// 取回图标组目录资源的原始字节
    pub fn group_data(&self, id: &ResourceId) -> Result<Vec<u8>> {
        with_resource_name(id, |name| {
            self.load_resource(RT_GROUP_ICON, name, &id.to_string())
        })
    }

    /// 取回单个图标条目（RT_ICON）的原始字节
    pub fn icon_data(&self, id: u16) -> Result<Vec<u8>> {
        self.load_resource(
            RT_ICON,
            PCWSTR(id as usize as *const u16),
            &format!("#{}", id),
        )
    }

    // 加载指定的资源数据
    fn load_resource(
        &self,
        resource_type: u16,
        resource_name: PCWSTR,
        display_id: &str,
    ) -> Result<Vec<u8>> {
        unsafe {
            let resource_info = FindResourceW(
                Some(self.module),
                resource_name,
                PCWSTR(resource_type as usize as *const u16),
            );
            if resource_info.is_invalid() {
                return Err(IconError::ResourceNotFound {
                    id: display_id.to_string(),
                });
            }

            let resource_handle = LoadResource(Some(self.module), resource_info).map_err(|e| {
                IconError::ResourceLoadFailed {
                    id: display_id.to_string(),
                    reason: e.to_string(),
                }
            })?;
            if resource_handle.is_invalid() {
                return Err(IconError::ResourceLoadFailed {
                    id: display_id.to_string(),
                    reason: "无效的资源句柄".to_string(),
                });
            }

            let resource_data = LockResource(resource_handle);
            if resource_data.is_null() {
                return Err(IconError::ResourceLoadFailed {
                    id: display_id.to_string(),
                    reason: "无法锁定资源".to_string(),
                });
            }

            let resource_size = SizeofResource(Some(self.module), resource_info);
            if resource_size == 0 {
                return Err(IconError::EmptyResource {
                    id: display_id.to_string(),
                });
            }

            let data_slice =
                std::slice::from_raw_parts(resource_data as *const u8, resource_size as usize);
            Ok(data_slice.to_vec())
        }
    }
}

impl Drop for ModuleResources {
    fn drop(&mut self) {
        unsafe {
            let _ = FreeLibrary(self.module);
        }
    }
}
