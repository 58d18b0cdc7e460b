//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! `GalleryServiceState` 作为 Tauri 注入状态持有导入器，由 `lib.rs` 的
//! `setup` 阶段创建。导入本身是阻塞的文件复制，这里统一放到
//! `spawn_blocking` 上执行，命令线程不被占用。
//!
//! 对外 API：
//! - `save_image`：导入单个文件
//! - `dispatch`：按方法通道语义分发调用
//! - `config`：当前生效配置

use std::io;
use std::sync::Arc;

use super::channel::{self, MethodCall, MethodResponse};
use super::{GalleryConfig, GalleryError, GalleryImporter, MediaIndex, MediaUri, UnavailableMediaIndex};

/// 图库服务状态。
pub struct GalleryServiceState {
    importer: Arc<GalleryImporter>,
}

impl GalleryServiceState {
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use growlog_lib::gallery::{GalleryConfig, GalleryServiceState, InMemoryMediaIndex};
    ///
    /// let service = GalleryServiceState::new(Arc::new(InMemoryMediaIndex::new()), GalleryConfig::default());
    /// ```
    pub fn new(index: Arc<dyn MediaIndex>, config: GalleryConfig) -> Self {
        Self {
            importer: Arc::new(GalleryImporter::new(index, config)),
        }
    }

    /// 媒体库打不开时的受限状态：命令照常注册，每次导入都以 `UNAVAILABLE` 失败，且不产生任何条目。
    pub fn unavailable(reason: impl Into<String>, config: GalleryConfig) -> Self {
        Self::new(Arc::new(UnavailableMediaIndex::new(reason)), config)
    }

    pub fn config(&self) -> &GalleryConfig {
        self.importer.config()
    }

    /// 在阻塞线程池中执行一次导入。
    pub async fn save_image(&self, image_path: Option<String>) -> Result<MediaUri, GalleryError> {
        let importer = Arc::clone(&self.importer);
        let joined = tokio::task::spawn_blocking(move || importer.import(image_path.as_deref())).await;

        joined.unwrap_or_else(|e| {
            log::error!("导入任务异常退出: {}", e);
            Err(GalleryError::TransferFailed {
                uri: None,
                source: io::Error::other(e.to_string()),
            })
        })
    }

    /// 在阻塞线程池中分发一次方法调用。
    pub async fn dispatch(&self, call: MethodCall) -> MethodResponse {
        let importer = Arc::clone(&self.importer);
        let joined =
            tokio::task::spawn_blocking(move || channel::handle_method_call(&importer, &call)).await;

        joined.unwrap_or_else(|e| {
            log::error!("通道任务异常退出: {}", e);
            MethodResponse::unavailable()
        })
    }
}
