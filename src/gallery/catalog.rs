//! # SQLite 媒体目录
//!
//! ## 设计思路
//!
//! 桌面端没有系统级媒体库，这里用 `rusqlite` 维护一份媒体目录，
//! 条目字节落在 `<root>/<relative_path>/` 下的普通文件中，
//! 与移动端媒体库保持同样的语义：建档即生成空文件，写入通道截断后写入。
//!
//! ## 实现思路
//!
//! - 连接放在 `Mutex<Connection>` 中，建档与查询串行化。
//! - 同名文件不覆盖，落盘文件名追加 ` (n)`，条目展示名保持原样。
//! - 条目一经创建不会被本模块删除。

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use super::config::is_valid_relative_path;
use super::{MediaIndex, MediaIndexError, MediaUri, MediaWriter, NewMediaEntry};

const SCHEMA_VERSION: i64 = 1;
const MAX_NAME_CANDIDATES: u32 = 10_000;

/// 媒体目录中的一条记录。
#[derive(Debug, Clone, Serialize)]
pub struct MediaRecord {
    pub id: i64,
    pub uri: String,
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    pub data_path: String,
    pub date_added: i64,
    pub size: u64,
}

/// 基于 SQLite 的媒体库实现。
pub struct SqliteMediaIndex {
    conn: Mutex<Connection>,
    root: PathBuf,
}

impl SqliteMediaIndex {
    /// 打开（或创建）位于 `db_path` 的媒体目录，条目文件存放在 `root` 下。
    pub fn open(db_path: &Path, root: impl Into<PathBuf>) -> Result<Self, MediaIndexError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)
            .map_err(|e| MediaIndexError::Storage(format!("打开媒体目录失败: {}", e)))?;
        log::info!("媒体目录路径: {}", db_path.display());
        Self::from_connection(conn, root.into())
    }

    /// 内存数据库，主要用于测试。
    pub fn open_in_memory(root: impl Into<PathBuf>) -> Result<Self, MediaIndexError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MediaIndexError::Storage(format!("打开内存媒体目录失败: {}", e)))?;
        Self::from_connection(conn, root.into())
    }

    fn from_connection(conn: Connection, root: PathBuf) -> Result<Self, MediaIndexError> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            root,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, MediaIndexError> {
        self.conn
            .lock()
            .map_err(|e| MediaIndexError::Storage(format!("获取媒体目录锁失败: {}", e)))
    }

    /// 条目文件的存储根目录。
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 按标识查找条目。
    pub fn find(&self, uri: &MediaUri) -> Result<Option<MediaRecord>, MediaIndexError> {
        let Some(id) = uri.image_id() else {
            return Ok(None);
        };
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, display_name, mime_type, relative_path, data_path, date_added
             FROM media WHERE id = ?1",
            params![id],
            map_record,
        )
        .optional()
        .map_err(|e| MediaIndexError::Storage(format!("查询媒体条目失败: {}", e)))
    }

    /// 最近导入的条目，按编号倒序。
    pub fn list_recent(&self, limit: usize) -> Result<Vec<MediaRecord>, MediaIndexError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, display_name, mime_type, relative_path, data_path, date_added
                 FROM media ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|e| MediaIndexError::Storage(format!("准备查询失败: {}", e)))?;
        let rows = stmt
            .query_map(params![limit as i64], map_record)
            .map_err(|e| MediaIndexError::Storage(format!("查询媒体条目失败: {}", e)))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| MediaIndexError::Storage(format!("读取媒体条目失败: {}", e)))
    }

    fn data_path_of(&self, uri: &MediaUri) -> io::Result<PathBuf> {
        let id = uri
            .image_id()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("无效媒体标识：{}", uri)))?;
        let conn = self.lock().map_err(io::Error::other)?;
        let data_path: Option<String> = conn
            .query_row("SELECT data_path FROM media WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(io::Error::other)?;
        data_path
            .map(PathBuf::from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("媒体条目不存在：{}", uri)))
    }
}

impl MediaIndex for SqliteMediaIndex {
    fn insert(&self, entry: &NewMediaEntry) -> Result<MediaUri, MediaIndexError> {
        if !is_valid_relative_path(&entry.relative_path) {
            return Err(MediaIndexError::Rejected(format!("非法相册目录：{}", entry.relative_path)));
        }
        if entry.display_name.is_empty()
            || entry.display_name.contains(['/', '\\'])
            || entry.display_name == "."
            || entry.display_name == ".."
        {
            return Err(MediaIndexError::Rejected(format!("非法展示名：{}", entry.display_name)));
        }

        let relative_path = entry.relative_path.trim_matches('/');
        let dir = self.root.join(relative_path);
        fs::create_dir_all(&dir)?;

        let conn = self.lock()?;
        let (data_path, _file) = reserve_data_file(&dir, &entry.display_name)?;
        let data_path_str = data_path.to_string_lossy().to_string();

        let inserted = conn.execute(
            "INSERT INTO media (display_name, mime_type, relative_path, data_path, date_added)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.display_name,
                entry.mime_type,
                relative_path,
                data_path_str,
                Utc::now().timestamp()
            ],
        );

        if let Err(e) = inserted {
            // 行未写入，预留的空文件不属于任何条目
            let _ = fs::remove_file(&data_path);
            return Err(MediaIndexError::Storage(format!("写入媒体目录失败: {}", e)));
        }

        let uri = MediaUri::for_image_id(conn.last_insert_rowid());
        log::debug!("🗂️ 新建媒体条目 {} -> {}", uri, data_path.display());
        Ok(uri)
    }

    fn open_writer(&self, uri: &MediaUri) -> io::Result<Box<dyn MediaWriter>> {
        let data_path = self.data_path_of(uri)?;
        let file = OpenOptions::new().write(true).truncate(true).open(&data_path)?;
        Ok(Box::new(file))
    }
}

fn initialize_schema(conn: &Connection) -> Result<(), MediaIndexError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| MediaIndexError::Storage(format!("读取媒体目录版本失败: {}", e)))?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            display_name TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            relative_path TEXT NOT NULL,
            data_path TEXT NOT NULL UNIQUE,
            date_added INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_media_relative_path ON media(relative_path);",
    )
    .map_err(|e| MediaIndexError::Storage(format!("创建媒体表失败: {}", e)))?;

    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
            .map_err(|e| MediaIndexError::Storage(format!("写入媒体目录版本失败: {}", e)))?;
    }
    Ok(())
}

fn map_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaRecord> {
    let id: i64 = row.get(0)?;
    let data_path: String = row.get(4)?;
    let size = fs::metadata(&data_path).map(|m| m.len()).unwrap_or(0);
    Ok(MediaRecord {
        id,
        uri: MediaUri::for_image_id(id).to_string(),
        display_name: row.get(1)?,
        mime_type: row.get(2)?,
        relative_path: row.get(3)?,
        data_path,
        date_added: row.get(5)?,
        size,
    })
}

/// 在目录中原子地占用一个不存在的文件名。
fn reserve_data_file(dir: &Path, display_name: &str) -> io::Result<(PathBuf, File)> {
    for n in 0..MAX_NAME_CANDIDATES {
        let candidate = dir.join(candidate_name(display_name, n));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("同名文件过多：{}", display_name),
    ))
}

fn candidate_name(display_name: &str, n: u32) -> String {
    if n == 0 {
        return display_name.to_string();
    }
    let path = Path::new(display_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| display_name.to_string());
    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(name: &str) -> NewMediaEntry {
        NewMediaEntry {
            display_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            relative_path: "Pictures/GrowLog".to_string(),
        }
    }

    #[test]
    fn insert_creates_empty_file_under_album() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");

        let uri = index.insert(&entry("cap.jpg")).expect("insert");
        let record = index.find(&uri).expect("find").expect("record exists");

        assert_eq!(record.display_name, "cap.jpg");
        assert_eq!(record.mime_type, "image/jpeg");
        assert_eq!(record.relative_path, "Pictures/GrowLog");
        assert_eq!(record.size, 0);
        assert_eq!(
            PathBuf::from(&record.data_path),
            root.path().join("Pictures/GrowLog/cap.jpg")
        );
    }

    #[test]
    fn same_name_gets_unique_data_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");

        let first = index.insert(&entry("photo1.jpg")).expect("first insert");
        let second = index.insert(&entry("photo1.jpg")).expect("second insert");
        assert_ne!(first, second);

        let record = index.find(&second).expect("find").expect("record exists");
        assert_eq!(record.display_name, "photo1.jpg");
        assert!(record.data_path.ends_with("photo1 (1).jpg"));
    }

    #[test]
    fn writer_truncates_and_writes_bytes() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");
        let uri = index.insert(&entry("a.jpg")).expect("insert");

        {
            let mut writer = index.open_writer(&uri).expect("open writer");
            writer.write_all(b"first version").expect("write");
        }
        {
            let mut writer = index.open_writer(&uri).expect("reopen writer");
            writer.write_all(b"v2").expect("write");
        }

        let record = index.find(&uri).expect("find").expect("record exists");
        assert_eq!(fs::read(&record.data_path).expect("read data"), b"v2");
        assert_eq!(record.size, 2);
    }

    #[test]
    fn insert_rejects_escaping_album_and_bad_names() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");

        let mut escaping = entry("a.jpg");
        escaping.relative_path = "../outside".to_string();
        assert!(matches!(index.insert(&escaping), Err(MediaIndexError::Rejected(_))));
        assert!(matches!(index.insert(&entry("")), Err(MediaIndexError::Rejected(_))));
        assert!(matches!(index.insert(&entry("a/b.jpg")), Err(MediaIndexError::Rejected(_))));
        assert!(index.list_recent(10).expect("list").is_empty());
    }

    #[test]
    fn committed_writer_leaves_bytes_on_disk() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");
        let uri = index.insert(&entry("c.jpg")).expect("insert");

        let mut writer = index.open_writer(&uri).expect("open writer");
        writer.write_all(b"committed").expect("write");
        writer.commit().expect("commit syncs the data file");
        drop(writer);

        let record = index.find(&uri).expect("find").expect("record exists");
        assert_eq!(fs::read(&record.data_path).expect("read data"), b"committed");
    }

    #[test]
    fn unknown_uri_has_no_writer() {
        let root = tempfile::tempdir().expect("tempdir");
        let index = SqliteMediaIndex::open_in_memory(root.path()).expect("open index");

        let err = index
            .open_writer(&MediaUri::for_image_id(99))
            .err()
            .expect("unknown uri must fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(index.find(&MediaUri::for_image_id(99)).expect("find").is_none());
    }

    #[test]
    fn catalog_persists_across_reopen() {
        let root = tempfile::tempdir().expect("tempdir");
        let db_path = root.path().join("index/media.db");

        let uri = {
            let index = SqliteMediaIndex::open(&db_path, root.path()).expect("open index");
            index.insert(&entry("keep.jpg")).expect("insert")
        };

        let index = SqliteMediaIndex::open(&db_path, root.path()).expect("reopen index");
        let recent = index.list_recent(5).expect("list");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].uri, uri.to_string());
    }

    #[test]
    fn candidate_name_keeps_extension() {
        assert_eq!(candidate_name("photo1.jpg", 0), "photo1.jpg");
        assert_eq!(candidate_name("photo1.jpg", 2), "photo1 (2).jpg");
        assert_eq!(candidate_name("README", 1), "README (1)");
    }
}
