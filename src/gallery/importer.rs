//! # 导入编排模块
//!
//! ## 设计思路
//!
//! `GalleryImporter` 不与 Tauri 绑定，只负责一次导入的线性流程：
//! 1. 解码入参（缺失 → `InvalidArgument`）
//! 2. 确认源文件存在（否则 `SourceNotFound`，不建档）
//! 3. 在媒体库建档（被拒 → `DestinationUnavailable`）
//! 4. 打开写入/读取通道并原样复制字节（失败 → `TransferFailed`）
//!
//! ## 实现思路
//!
//! - 两个通道都是 `transfer` 内的局部值，任何返回路径都会随作用域释放。
//! - 复制完成后调用 `MediaWriter::commit`（桌面端为 `sync_all`），关闭阶段的写入错误也会上报。
//! - 建档后失败时条目保留在媒体库中，不做清理。
//! - 记录 `insert/copy/total` 阶段耗时与错误码。

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::time::Instant;

use super::source::SourceFile;
use super::{GalleryConfig, GalleryError, ImageArgument, MediaIndex, MediaUri, NewMediaEntry};

/// 图库导入器。
pub struct GalleryImporter {
    index: Arc<dyn MediaIndex>,
    config: GalleryConfig,
}

impl GalleryImporter {
    pub fn new(index: Arc<dyn MediaIndex>, config: GalleryConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// 将本地文件导入媒体库，返回新条目的标识。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use growlog_lib::gallery::{GalleryConfig, GalleryImporter, InMemoryMediaIndex};
    ///
    /// let importer = GalleryImporter::new(Arc::new(InMemoryMediaIndex::new()), GalleryConfig::default());
    /// let uri = importer.import(Some("/data/tmp/cap.jpg"))?;
    /// println!("{uri}");
    /// # Ok::<(), growlog_lib::gallery::GalleryError>(())
    /// ```
    pub fn import(&self, source_path: Option<&str>) -> Result<MediaUri, GalleryError> {
        let started = Instant::now();
        let result = self.run(source_path, started);

        match &result {
            Ok(_) => {}
            Err(err) if err.left_orphan_entry() => {
                log::error!("❌ 导入图库失败 [{}]，条目已残留：{}", err.code(), err);
            }
            Err(err) => {
                log::warn!("⚠️ 导入图库失败 [{}]：{}", err.code(), err);
            }
        }

        result
    }

    fn run(&self, source_path: Option<&str>, started: Instant) -> Result<MediaUri, GalleryError> {
        let path = match ImageArgument::decode(source_path) {
            ImageArgument::Present(path) => path,
            ImageArgument::Absent => {
                return Err(GalleryError::InvalidArgument("未提供图片路径".to_string()));
            }
        };

        let source = SourceFile::resolve(&path)?;
        log::info!("📁 开始导入图库 - 路径: {}（{} 字节）", path, source.len);

        let entry = NewMediaEntry {
            display_name: source.display_name.clone(),
            mime_type: self.config.mime_type.clone(),
            relative_path: self.config.relative_path.clone(),
        };

        let insert_started = Instant::now();
        let uri = self.index.insert(&entry)?;
        let insert_ms = insert_started.elapsed().as_millis();

        let copy_started = Instant::now();
        let copied = self
            .transfer(&source, &uri)
            .map_err(|e| GalleryError::TransferFailed {
                uri: Some(uri.to_string()),
                source: e,
            })?;

        log::info!(
            "✅ 已导入图库 {} -> {}（{} 字节，insert={}ms, copy={}ms, total={}ms）",
            source.display_name,
            uri,
            copied,
            insert_ms,
            copy_started.elapsed().as_millis(),
            started.elapsed().as_millis()
        );

        Ok(uri)
    }

    fn transfer(&self, source: &SourceFile, uri: &MediaUri) -> io::Result<u64> {
        let mut writer = self.index.open_writer(uri)?;
        let mut reader = BufReader::with_capacity(self.config.copy_buffer_size, File::open(&source.path)?);

        self.warn_on_mislabel(&mut reader, &source.display_name)?;

        let copied = io::copy(&mut reader, &mut writer)?;
        writer.commit()?;
        Ok(copied)
    }

    /// 只记录内容与类型标签不一致，不修改标签。
    fn warn_on_mislabel(&self, reader: &mut BufReader<File>, display_name: &str) -> io::Result<()> {
        let head = reader.fill_buf()?;
        if let Some(kind) = infer::get(head) {
            if kind.mime_type() != self.config.mime_type {
                log::warn!(
                    "⚠️ {} 实际内容为 {}，仍按 {} 标记",
                    display_name,
                    kind.mime_type(),
                    self.config.mime_type
                );
            }
        }
        Ok(())
    }
}
