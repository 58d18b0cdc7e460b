//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部入参”和“已解析的源文件”解耦：
//! - `ImageArgument` 表示 IPC 边界上可能缺失的路径参数
//! - `SourceFile` 表示已确认存在的普通文件及其展示名

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::GalleryError;

/// 边界入参：路径存在或缺失。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageArgument {
    Present(String),
    Absent,
}

impl ImageArgument {
    /// 空串和纯空白视为缺失；其余路径原样保留，不做裁剪。
    pub fn decode(raw: Option<&str>) -> Self {
        match raw {
            Some(path) if !path.trim().is_empty() => Self::Present(path.to_string()),
            _ => Self::Absent,
        }
    }
}

/// 已解析的源文件。
#[derive(Debug, Clone)]
pub(crate) struct SourceFile {
    pub(crate) path: PathBuf,
    /// 源文件名（不含目录），作为媒体条目的展示名。
    pub(crate) display_name: String,
    pub(crate) len: u64,
}

impl SourceFile {
    /// 解析路径，仅接受已存在的普通文件。
    pub(crate) fn resolve(path: &str) -> Result<Self, GalleryError> {
        let file_path = Path::new(path);

        let metadata = match fs::metadata(file_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GalleryError::SourceNotFound(path.to_string()));
            }
            Err(e) => {
                return Err(GalleryError::SourceNotFound(format!("{}（{}）", path, e)));
            }
        };

        if !metadata.is_file() {
            return Err(GalleryError::SourceNotFound(format!("{}（不是普通文件）", path)));
        }

        let display_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| GalleryError::InvalidArgument(format!("路径缺少文件名：{}", path)))?;

        Ok(Self {
            path: file_path.to_path_buf(),
            display_name,
            len: metadata.len(),
        })
    }
}
