//! # 内存媒体库
//!
//! 不依赖设备的 `MediaIndex` 实现，供测试注入。支持以下故障模拟：
//! - `refuse_inserts`：建档被拒
//! - `fail_writes_after`：写入若干字节后通道断开
//! - `fail_commits`：字节全部写入，但提交阶段报错
//! - `with_writer_limit`：写入句柄池有上限，未释放的句柄会耗尽池
//!
//! 写入直接追加到条目内容，失败后残留的部分字节可被检查。

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{MediaIndex, MediaIndexError, MediaUri, MediaWriter, NewMediaEntry};

/// 内存中的条目快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    entries: BTreeMap<i64, MemoryEntry>,
}

/// 内存媒体库。
#[derive(Debug, Default)]
pub struct InMemoryMediaIndex {
    state: Arc<Mutex<MemoryState>>,
    open_writers: Arc<AtomicUsize>,
    writer_limit: Option<usize>,
    refuse_inserts: AtomicBool,
    fail_commits: AtomicBool,
    fail_after: Mutex<Option<usize>>,
}

impl InMemoryMediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 限制同时存活的写入句柄数量。
    pub fn with_writer_limit(limit: usize) -> Self {
        Self {
            writer_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn refuse_inserts(&self, refuse: bool) {
        self.refuse_inserts.store(refuse, Ordering::SeqCst);
    }

    /// 之后打开的写入通道在提交时报错。
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// 之后打开的写入通道在写满 `bytes` 字节后断开；`None` 取消。
    pub fn fail_writes_after(&self, bytes: Option<usize>) {
        if let Ok(mut guard) = self.fail_after.lock() {
            *guard = bytes;
        }
    }

    /// 当前仍未释放的写入句柄数。
    pub fn open_writers(&self) -> usize {
        self.open_writers.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entry(&self, uri: &MediaUri) -> Option<MemoryEntry> {
        let id = uri.image_id()?;
        self.state.lock().ok()?.entries.get(&id).cloned()
    }
}

impl MediaIndex for InMemoryMediaIndex {
    fn insert(&self, entry: &NewMediaEntry) -> Result<MediaUri, MediaIndexError> {
        if self.refuse_inserts.load(Ordering::SeqCst) {
            return Err(MediaIndexError::Rejected("内存媒体库拒绝建档".to_string()));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| MediaIndexError::Storage("内存媒体库锁已中毒".to_string()))?;
        state.next_id += 1;
        let id = state.next_id;
        state.entries.insert(
            id,
            MemoryEntry {
                display_name: entry.display_name.clone(),
                mime_type: entry.mime_type.clone(),
                relative_path: entry.relative_path.clone(),
                bytes: Vec::new(),
            },
        );
        Ok(MediaUri::for_image_id(id))
    }

    fn open_writer(&self, uri: &MediaUri) -> io::Result<Box<dyn MediaWriter>> {
        let id = uri
            .image_id()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, uri.to_string()))?;

        let previous = self.open_writers.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.writer_limit {
            if previous >= limit {
                self.open_writers.fetch_sub(1, Ordering::SeqCst);
                return Err(io::Error::other(format!("写入句柄池已耗尽（上限 {}）", limit)));
            }
        }

        // 句柄从这里起由 MemoryWriter 持有，后续失败随 drop 归还
        let writer = MemoryWriter {
            id,
            state: Arc::clone(&self.state),
            open_writers: Arc::clone(&self.open_writers),
            remaining: self.fail_after.lock().ok().and_then(|guard| *guard),
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
        };

        {
            let mut state = self.state.lock().map_err(|_| io::Error::other("内存媒体库锁已中毒"))?;
            let entry = state
                .entries
                .get_mut(&id)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, uri.to_string()))?;
            entry.bytes.clear();
        }

        Ok(Box::new(writer))
    }
}

struct MemoryWriter {
    id: i64,
    state: Arc<Mutex<MemoryState>>,
    open_writers: Arc<AtomicUsize>,
    remaining: Option<usize>,
    fail_commit: bool,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let accepted = match self.remaining {
            Some(0) => {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "写入通道已被外部关闭"));
            }
            Some(remaining) => buf.len().min(remaining),
            None => buf.len(),
        };

        let mut state = self.state.lock().map_err(|_| io::Error::other("内存媒体库锁已中毒"))?;
        let entry = state
            .entries
            .get_mut(&self.id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "媒体条目已消失"))?;
        entry.bytes.extend_from_slice(&buf[..accepted]);

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= accepted;
        }
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MediaWriter for MemoryWriter {
    fn commit(&mut self) -> io::Result<()> {
        if self.fail_commit {
            return Err(io::Error::other("提交写入失败"));
        }
        self.flush()
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.open_writers.fetch_sub(1, Ordering::SeqCst);
    }
}
