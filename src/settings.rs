use std::fs;
use std::path::{Path, PathBuf};

use tauri::AppHandle;

use crate::error::AppError;
use crate::storage;

const SETTINGS_FILE: &str = "settings.json";

fn settings_file_path(app: &AppHandle) -> Result<PathBuf, AppError> {
    Ok(storage::app_data_dir(app)?.join(SETTINGS_FILE))
}

fn read_settings_file(path: &Path) -> Result<Option<serde_json::Value>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<serde_json::Value>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    Ok(Some(parsed))
}

fn write_settings_file(path: &Path, settings: &serde_json::Value) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

/// 启动时读取设置；文件缺失或损坏时返回 `None`，不阻断启动。
pub fn load_settings(app: &AppHandle) -> Option<serde_json::Value> {
    let loaded = settings_file_path(app).and_then(|path| read_settings_file(&path));
    match loaded {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("读取应用设置失败，使用默认配置: {err}");
            None
        }
    }
}

#[tauri::command]
pub fn get_app_settings(app: AppHandle) -> Result<Option<serde_json::Value>, AppError> {
    let settings_path = settings_file_path(&app)?;
    read_settings_file(&settings_path)
}

/// 保存设置。图库相关项（`gallery`）在下次启动时生效。
#[tauri::command]
pub fn set_app_settings(app: AppHandle, settings: serde_json::Value) -> Result<(), AppError> {
    let settings_path = settings_file_path(&app)?;
    write_settings_file(&settings_path, &settings)
}
