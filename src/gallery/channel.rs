//! # 方法通道
//!
//! ## 设计思路
//!
//! 前端以“方法名 + 命名参数”的形式发起调用，后端返回三种结果之一：
//! `success`、`error`、`notImplemented`。未知方法名不是错误，只是未实现。
//!
//! 导入失败的具体分支不会透传，统一折叠为 `UNAVAILABLE` 与固定文案。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GalleryError, GalleryImporter, MediaUri};

/// 通道名。
pub const CHANNEL_NAME: &str = "org.jksevend.growlog";

/// 唯一支持的方法。
pub const SAVE_IMAGE_TO_GALLERY: &str = "saveImageToGallery";

/// 方法参数名。
pub const IMAGE_PATH_ARG: &str = "imagePath";

/// 边界统一错误码。
pub const UNAVAILABLE: &str = "UNAVAILABLE";

/// 边界统一错误文案。
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save image to gallery.";

/// 一次方法调用。
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// 读取字符串参数；缺失、`null` 或非字符串均视为没有。
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// 方法调用结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn unavailable() -> Self {
        Self::Error {
            code: UNAVAILABLE.to_string(),
            message: SAVE_FAILED_MESSAGE.to_string(),
            details: None,
        }
    }
}

impl From<Result<MediaUri, GalleryError>> for MethodResponse {
    fn from(result: Result<MediaUri, GalleryError>) -> Self {
        match result {
            Ok(uri) => Self::Success {
                result: Value::String(uri.to_string()),
            },
            Err(_) => Self::unavailable(),
        }
    }
}

/// 分发一次方法调用。
pub fn handle_method_call(importer: &GalleryImporter, call: &MethodCall) -> MethodResponse {
    if call.method != SAVE_IMAGE_TO_GALLERY {
        log::debug!("通道 {} 收到未实现的方法：{}", CHANNEL_NAME, call.method);
        return MethodResponse::NotImplemented;
    }

    importer.import(call.argument_str(IMAGE_PATH_ARG)).into()
}
