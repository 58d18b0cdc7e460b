//! # 媒体库端口
//!
//! ## 设计思路
//!
//! 平台共享媒体库只需要两项能力：按元数据建档、为条目打开写入通道。
//! 以 trait 注入导入器，桌面端使用 SQLite 目录实现，测试使用内存实现。

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::str::FromStr;

use super::MediaIndexError;

/// 图片集合的 URI 前缀。
pub const EXTERNAL_IMAGES_URI: &str = "content://media/external/images/media";

/// 媒体库分配给条目的不透明标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUri(String);

impl MediaUri {
    /// 由条目编号生成图片集合下的标识。
    pub fn for_image_id(id: i64) -> Self {
        Self(format!("{}/{}", EXTERNAL_IMAGES_URI, id))
    }

    /// 解析图片集合下的条目编号。
    pub fn image_id(&self) -> Option<i64> {
        self.0
            .strip_prefix(EXTERNAL_IMAGES_URI)?
            .strip_prefix('/')?
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaUri {
    type Err = MediaIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri = Self(s.trim().to_string());
        match uri.image_id() {
            Some(_) => Ok(uri),
            None => Err(MediaIndexError::Rejected(format!("无法识别的媒体标识：{}", s))),
        }
    }
}

/// 建档请求的元数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaEntry {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
}

/// 条目写入通道。
///
/// 复制结束后必须调用 `commit`：它是关闭阶段错误（缓冲刷新、落盘）唯一的上报点，
/// 直接 drop 会吞掉这些错误。
pub trait MediaWriter: Write + Send {
    fn commit(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl MediaWriter for File {
    /// `File` 没有用户态缓冲，`flush` 不做任何事；提交时同步到存储介质。
    fn commit(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// 平台共享媒体库。
pub trait MediaIndex: Send + Sync {
    /// 按元数据创建新条目，返回其标识。
    fn insert(&self, entry: &NewMediaEntry) -> Result<MediaUri, MediaIndexError>;

    /// 打开条目的写入通道（截断已有内容）。
    fn open_writer(&self, uri: &MediaUri) -> io::Result<Box<dyn MediaWriter>>;
}

/// 媒体库无法打开时的占位实现：拒绝一切建档，命令仍按失败契约应答。
#[derive(Debug, Clone)]
pub struct UnavailableMediaIndex {
    reason: String,
}

impl UnavailableMediaIndex {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl MediaIndex for UnavailableMediaIndex {
    fn insert(&self, _entry: &NewMediaEntry) -> Result<MediaUri, MediaIndexError> {
        Err(MediaIndexError::Rejected(self.reason.clone()))
    }

    fn open_writer(&self, uri: &MediaUri) -> io::Result<Box<dyn MediaWriter>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("媒体库不可用，无法打开 {}：{}", uri, self.reason),
        ))
    }
}
