//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，除图库导入命令外，所有
//! `#[tauri::command]` 函数统一返回 `Result<T, AppError>`，
//! 前端通过 `Serialize` 获得一致的错误信息。
//!
//! 图库导入命令有自己的边界错误（`GalleryCommandError`），固定为
//! `UNAVAILABLE`，不经过这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `GalleryError`、`std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 Tauri IPC 要求。

use serde::Serialize;

use crate::gallery::GalleryError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图库导入或媒体目录错误
    #[error("{0}")]
    Gallery(#[from] GalleryError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 应用设置读写失败
    #[error("设置错误: {0}")]
    Settings(String),
}

/// Tauri IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
