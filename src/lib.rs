//! # GrowLog 图库桥接 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  前端 (WebView)                           │
//! │                                                          │
//! │  拍照 / 保存到临时文件 → invoke("save_image_to_gallery") │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC (String | { code: UNAVAILABLE, message })
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ gallery ──── 导入编排 + 方法通道                     │
//! │  │   ├─ importer     校验源文件 → 建档 → 复制字节        │
//! │  │   ├─ catalog      SQLite 媒体目录 (rusqlite)          │
//! │  │   └─ memory       测试用内存媒体库                    │
//! │  │                                                       │
//! │  ├─ storage            媒体根目录 / 目录数据库路径       │
//! │  └─ settings           settings.json 读写                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`gallery`] | 把已保存的图片复制进系统图库，返回条目标识 |
//! | [`storage`] | 媒体根目录与目录数据库位置的获取与自动创建 |
//! | [`settings`] | 应用设置文件读写，`gallery` 项作为导入配置 |

pub mod error;
pub mod gallery;
pub mod settings;
pub mod storage;

use std::sync::Arc;

use tauri::{AppHandle, Manager};

use crate::error::AppError;
use crate::gallery::{GalleryConfig, GalleryError, GalleryServiceState, SqliteMediaIndex};

fn open_media_index(app: &AppHandle) -> Result<Arc<SqliteMediaIndex>, AppError> {
    let root = storage::get_media_root(app)?;
    let db_path = storage::get_media_index_path(app)?;
    let index = SqliteMediaIndex::open(&db_path, root).map_err(GalleryError::from)?;
    Ok(Arc::new(index))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .setup(|app| {
            log::info!("setup: begin");
            let handle = app.handle().clone();

            let settings = settings::load_settings(&handle);
            let config = GalleryConfig::from_settings(settings.as_ref());
            log::info!(
                "setup: gallery config loaded（album={}, mime={}）",
                config.relative_path,
                config.mime_type
            );

            // 初始化媒体库并注册为托管状态
            match open_media_index(&handle) {
                Ok(index) => {
                    app.manage(GalleryServiceState::new(index.clone(), config));
                    app.manage(index);
                    log::info!("setup: gallery service managed");
                }
                Err(err) => {
                    log::error!("setup: 媒体库初始化失败，应用将以受限模式运行: {err}");
                    app.manage(GalleryServiceState::unavailable(err.to_string(), config));
                }
            }

            log::info!("setup: complete");
            Ok(())
        })
        // 注册所有 Tauri 命令
        .invoke_handler(tauri::generate_handler![
            // 图库导入
            gallery::commands::save_image_to_gallery,
            gallery::commands::gallery_channel,
            gallery::commands::get_gallery_entry,
            gallery::commands::get_gallery_dir_info,
            // 应用设置存储
            settings::get_app_settings,
            settings::set_app_settings,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
