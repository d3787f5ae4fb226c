pub mod file;
pub mod memory;
pub mod safe;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use safe::{SafeStorage, Storages};

use crate::error::StorageError;

/// 字符串键值存储，允许失败
///
/// 实现方把所有故障作为错误返回；由 `SafeStorage` 记录日志后忽略。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
