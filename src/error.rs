use thiserror::Error;

/// 底层键值存储的错误
///
/// 这些错误只在 `storage` 模块内部流动，`SafeStorage` 会记录后吞掉。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store is corrupted: {0}")]
    Corrupted(String),

    #[error("quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },
}

/// 字符串到领域值的解析错误（CLI 参数、表单字段）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown priority '{0}' (expected low, medium or high)")]
    UnknownPriority(String),

    #[error("unknown status '{0}' (expected pending, progress, completed or cancelled)")]
    UnknownStatus(String),

    #[error("unknown sort field '{0}'")]
    UnknownSortBy(String),

    #[error("unknown sort order '{0}' (expected asc or desc)")]
    UnknownSortOrder(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}
