// 常量定义

// PE资源类型常量
pub const RT_ICON: u16 = 3; // 图标资源
pub const RT_GROUP_ICON: u16 = 14; // 图标组资源

// 资源类型字段取值（图标为1，光标为2）
pub const ICON_RESOURCE_TYPE: u16 = 1;

// PNG文件签名（前4字节）
pub const PNG_SIGNATURE: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

// PNG尺寸读取所需的最小长度：8字节签名 + IHDR块头 + 宽度 + 高度
pub const PNG_HEADER_MIN_LEN: usize = 24;

// 图标组目录布局
pub const GROUP_DIR_SIZE: usize = 6; // 保留(2) + 类型(2) + 数量(2)
pub const GROUP_ENTRY_SIZE: usize = 14; // 图标组目录条目大小

// ICO文件布局
pub const ICO_DIR_SIZE: usize = 6; // ICONDIR 头大小
pub const ICO_ENTRY_SIZE: usize = 16; // ICONDIRENTRY 条目大小
