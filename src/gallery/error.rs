//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 导入链路只有四种失败：参数无效、源文件不存在、媒体库拒绝建档、字节传输失败。
//! 使用单一错误枚举承载，调用侧可按分支匹配；对外边界统一折叠为
//! `UNAVAILABLE`，具体分支只写日志。

use std::io;

/// 媒体库端口错误（建档阶段）。
#[derive(Debug, thiserror::Error)]
pub enum MediaIndexError {
    #[error("媒体库拒绝建档：{0}")]
    Rejected(String),

    #[error("媒体库存储错误：{0}")]
    Storage(String),

    #[error("媒体库文件错误：{0}")]
    Io(#[from] io::Error),
}

/// 图库导入统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("参数无效：{0}")]
    InvalidArgument(String),

    #[error("源文件不存在：{0}")]
    SourceNotFound(String),

    #[error("媒体库不可用：{0}")]
    DestinationUnavailable(#[from] MediaIndexError),

    /// `uri` 为 `None` 表示没有可定位的条目（例如导入任务本身异常退出）。
    #[error("写入媒体条目 {} 失败：{source}", .uri.as_deref().unwrap_or("（未建档）"))]
    TransferFailed {
        uri: Option<String>,
        #[source]
        source: io::Error,
    },
}

impl GalleryError {
    /// 稳定错误码，仅用于本地诊断日志。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "E_INVALID_ARGUMENT",
            Self::SourceNotFound(_) => "E_SOURCE_NOT_FOUND",
            Self::DestinationUnavailable(_) => "E_DESTINATION_UNAVAILABLE",
            Self::TransferFailed { .. } => "E_TRANSFER_FAILED",
        }
    }

    /// 是否已经在媒体库中留下条目（可能为空或不完整）。
    pub fn left_orphan_entry(&self) -> bool {
        matches!(self, Self::TransferFailed { uri: Some(_), .. })
    }
}
