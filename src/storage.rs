//! 媒体存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理媒体库的两个落盘位置：
//! - 媒体根目录：条目文件存放在 `<根目录>/<相册子目录>/` 下，
//!   相当于移动端的外部存储根目录。
//! - 媒体目录数据库：`rusqlite` 目录文件，放在应用数据目录中。
//!
//! # 实现思路
//!
//! - 媒体根目录优先使用用户主目录（得到 `~/Pictures/GrowLog`），
//!   获取失败时回退到应用数据目录下的 `media` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tauri::{AppHandle, Manager};

use crate::error::AppError;

const MEDIA_INDEX_FILE: &str = "media_index.db";

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取媒体根目录
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的媒体根目录
/// - `Err(AppError::Storage)` — 无法获取或创建目录
pub fn get_media_root(app: &AppHandle) -> Result<PathBuf, AppError> {
    match app.path().home_dir() {
        Ok(home) => Ok(home),
        Err(err) => {
            log::warn!("获取用户主目录失败，回退到应用数据目录: {}", err);
            let fallback = app_data_dir(app)?.join("media");
            ensure_dir(&fallback)?;
            Ok(fallback)
        }
    }
}

/// 获取媒体目录数据库路径
pub fn get_media_index_path(app: &AppHandle) -> Result<PathBuf, AppError> {
    Ok(app_data_dir(app)?.join(MEDIA_INDEX_FILE))
}

/// 获取应用数据目录（不存在时创建）
pub fn app_data_dir(app: &AppHandle) -> Result<PathBuf, AppError> {
    let dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))?;
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("a/b/c");

        ensure_dir(&nested).expect("create nested");
        assert!(nested.is_dir());
        ensure_dir(&nested).expect("existing dir is fine");
    }
}
