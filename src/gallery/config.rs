//! # 配置模块
//!
//! ## 设计思路
//!
//! 导入策略集中到 `GalleryConfig`：媒体类型标签、相册子目录、复制缓冲区大小。
//! `Default` 即生产配置；`from_settings` 允许 `settings.json` 中的 `gallery`
//! 对象覆盖相册子目录与缓冲区大小。
//!
//! 媒体类型固定为 `image/jpeg`，不随实际内容改变（PNG 也会被标为 JPEG），
//! 设置文件无法覆盖此项。

use std::path::{Component, Path};

/// 媒体条目的固定类型标签。
pub const GALLERY_MIME_TYPE: &str = "image/jpeg";

/// 默认相册子目录（相对于外部存储根目录）。
pub const DEFAULT_RELATIVE_PATH: &str = "Pictures/GrowLog";

const DEFAULT_COPY_BUFFER_SIZE: usize = 64 * 1024;
const MIN_COPY_BUFFER_SIZE: usize = 4 * 1024;
const MAX_COPY_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// 图库导入配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    /// 写入媒体条目的类型标签。
    pub mime_type: String,
    /// 媒体条目所在的逻辑子目录。
    pub relative_path: String,
    /// 源文件读取缓冲区大小（字节）。
    pub copy_buffer_size: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            mime_type: GALLERY_MIME_TYPE.to_string(),
            relative_path: DEFAULT_RELATIVE_PATH.to_string(),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

impl GalleryConfig {
    /// 从应用设置中读取覆盖项，非法值回退默认并记录警告。
    ///
    /// ```json
    /// { "gallery": { "relativePath": "Pictures/GrowLog", "copyBufferSize": 65536 } }
    /// ```
    pub fn from_settings(settings: Option<&serde_json::Value>) -> Self {
        let mut config = Self::default();
        let Some(gallery) = settings.and_then(|s| s.get("gallery")) else {
            return config;
        };

        if let Some(relative_path) = gallery.get("relativePath").and_then(|v| v.as_str()) {
            if is_valid_relative_path(relative_path) {
                config.relative_path = relative_path.trim_matches('/').to_string();
            } else {
                log::warn!("⚠️ 忽略非法相册目录设置：{:?}", relative_path);
            }
        }

        if let Some(size) = gallery.get("copyBufferSize").and_then(|v| v.as_u64()) {
            let size = usize::try_from(size).unwrap_or(MAX_COPY_BUFFER_SIZE);
            config.copy_buffer_size = size.clamp(MIN_COPY_BUFFER_SIZE, MAX_COPY_BUFFER_SIZE);
        }

        config
    }
}

/// 相册目录只允许普通的相对路径段，禁止 `..` 与绝对路径。
pub fn is_valid_relative_path(relative_path: &str) -> bool {
    let trimmed = relative_path.trim_matches('/');
    if trimmed.is_empty() || relative_path.starts_with('/') {
        return false;
    }
    Path::new(trimmed)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
