use std::fmt;
use std::path::Path;

use tracing::warn;

use super::{FileStore, KeyValueStore, MemoryStore};

/// 对 `KeyValueStore` 的安全封装，永远不会失败
///
/// `inner == None` 表示当前环境没有可用的存储。底层存储的错误都以 `warn`
/// 级别记录，读取时返回“没有数据”，写入时返回 `false`；不会返回错误也不会 panic。
pub struct SafeStorage {
    name: &'static str,
    inner: Option<Box<dyn KeyValueStore>>,
}

impl SafeStorage {
    pub fn new(name: &'static str, store: impl KeyValueStore + 'static) -> Self {
        Self {
            name,
            inner: Some(Box::new(store)),
        }
    }

    /// 存储不可达时使用
    pub fn unavailable(name: &'static str) -> Self {
        Self { name, inner: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.as_ref()?;
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(storage = self.name, key, error = %e, "failed to get item");
                None
            }
        }
    }

    /// 返回是否写入成功
    pub fn set(&self, key: &str, value: &str) -> bool {
        let Some(store) = self.inner.as_ref() else {
            return false;
        };
        match store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(storage = self.name, key, error = %e, "failed to set item");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Some(store) = self.inner.as_ref() {
            if let Err(e) = store.remove(key) {
                warn!(storage = self.name, key, error = %e, "failed to remove item");
            }
        }
    }

    pub fn clear(&self) {
        if let Some(store) = self.inner.as_ref() {
            if let Err(e) = store.clear() {
                warn!(storage = self.name, error = %e, "failed to clear storage");
            }
        }
    }
}

impl fmt::Debug for SafeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeStorage")
            .field("name", &self.name)
            .field("available", &self.is_available())
            .finish()
    }
}

/// 持久化存储 + 会话级存储，两者互相独立
#[derive(Debug)]
pub struct Storages {
    pub local: SafeStorage,
    pub session: SafeStorage,
}

impl Storages {
    pub fn new(local: SafeStorage, session: SafeStorage) -> Self {
        Self { local, session }
    }

    /// `data_file` 处的文件存储 + 内存中的会话存储
    pub fn open(data_file: &Path) -> Self {
        Self {
            local: SafeStorage::new("local", FileStore::new(data_file)),
            session: SafeStorage::new("session", MemoryStore::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            local: SafeStorage::unavailable("local"),
            session: SafeStorage::unavailable("session"),
        }
    }
}
