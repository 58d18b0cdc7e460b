//! # 图库导入模块（gallery）
//!
//! ## 设计思路
//!
//! 把“已保存在设备上的图片复制进系统图库”拆成几个职责单一的子模块：
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装）
//! - `service`：承载可注入状态（`GalleryServiceState`）
//! - `channel`：方法通道语义（方法名分发、`notImplemented`）
//! - `importer`：一次导入的线性流程
//! - `media_index`：平台媒体库端口（trait）
//! - `catalog`：桌面端 SQLite 媒体目录
//! - `memory`：测试用内存媒体库
//! - `config/error/source`：配置、错误、入参模型
//!
//! ## 调用链
//!
//! ```text
//! 前端 invoke
//!    ↓
//! commands.rs（参数适配，错误折叠为 UNAVAILABLE）
//!    ↓
//! service.rs（State 注入，spawn_blocking）
//!    ↓
//! importer.rs（解码入参 → 校验源文件 → 建档 → 复制字节）
//!    ↓
//! MediaIndex（catalog.rs / memory.rs）
//! ```

pub mod catalog;
pub mod channel;
pub mod commands;
mod config;
mod error;
mod importer;
mod media_index;
pub mod memory;
mod service;
mod source;

pub use catalog::{MediaRecord, SqliteMediaIndex};
pub use channel::{MethodCall, MethodResponse};
pub use commands::{
    gallery_channel,
    get_gallery_dir_info,
    get_gallery_entry,
    save_image_to_gallery,
};
pub use config::{GalleryConfig, DEFAULT_RELATIVE_PATH, GALLERY_MIME_TYPE};
pub use error::{GalleryError, MediaIndexError};
pub use importer::GalleryImporter;
pub use media_index::{
    MediaIndex, MediaUri, MediaWriter, NewMediaEntry, UnavailableMediaIndex, EXTERNAL_IMAGES_URI,
};
pub use memory::InMemoryMediaIndex;
pub use service::GalleryServiceState;
pub use source::ImageArgument;
