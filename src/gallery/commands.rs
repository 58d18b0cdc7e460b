//! # Tauri 命令层
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 导入失败统一返回 `{ code: "UNAVAILABLE", message: "Failed to save image to gallery." }`，
//! 具体原因只在后端日志中出现。

use std::fs;
use std::sync::Arc;

use tauri::{Manager, State};

use super::catalog::{MediaRecord, SqliteMediaIndex};
use super::channel::{MethodCall, MethodResponse, SAVE_FAILED_MESSAGE, UNAVAILABLE};
use super::service::GalleryServiceState;
use super::{GalleryError, MediaUri};
use crate::error::AppError;
use crate::storage::{self, StorageInfo};

#[derive(Debug, Clone, serde::Serialize)]
pub struct GalleryCommandError {
    pub code: &'static str,
    pub message: &'static str,
}

impl From<GalleryError> for GalleryCommandError {
    fn from(_: GalleryError) -> Self {
        Self {
            code: UNAVAILABLE,
            message: SAVE_FAILED_MESSAGE,
        }
    }
}

/// 将本地图片复制进系统图库，返回新条目的标识。
#[tauri::command]
pub async fn save_image_to_gallery(
    state: State<'_, GalleryServiceState>,
    image_path: Option<String>,
) -> Result<String, GalleryCommandError> {
    let uri = state
        .save_image(image_path)
        .await
        .map_err(GalleryCommandError::from)?;
    Ok(uri.to_string())
}

/// 方法通道入口：`{ method, arguments }`。
#[tauri::command]
pub async fn gallery_channel(
    state: State<'_, GalleryServiceState>,
    call: MethodCall,
) -> Result<MethodResponse, AppError> {
    Ok(state.dispatch(call).await)
}

/// 按标识查询已导入的条目。
#[tauri::command]
pub fn get_gallery_entry(app: tauri::AppHandle, uri: String) -> Result<Option<MediaRecord>, AppError> {
    // 受限模式下没有目录可查
    let Some(index) = app.try_state::<Arc<SqliteMediaIndex>>() else {
        return Err(AppError::Storage("媒体目录未初始化".to_string()));
    };
    let Ok(uri) = uri.parse::<MediaUri>() else {
        return Ok(None);
    };
    Ok(index.find(&uri).map_err(GalleryError::from)?)
}

/// 相册目录信息（路径 + 占用大小 + 文件数）。
#[tauri::command]
pub fn get_gallery_dir_info(
    app: tauri::AppHandle,
    state: State<'_, GalleryServiceState>,
) -> Result<StorageInfo, AppError> {
    let dir = storage::get_media_root(&app)?.join(&state.config().relative_path);
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}
