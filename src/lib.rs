//! 本地待办事项管理
//!
//! [`store::TodoStore`] 持有任务集合和当前筛选条件，并派生出筛选后的列表、分类和统计。
//! 持久化通过 [`storage::SafeStorage`] 完成，存储故障不会传递给调用方。

pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod storage;
pub mod store;

pub use error::{ParseError, StorageError};
pub use models::{
    FieldFilter, Identity, Priority, SortBy, SortOrder, Status, Todo, TodoFilters, TodoFormData,
    TodoPatch, TodoStats,
};
pub use seed::seed_todos;
pub use storage::{SafeStorage, Storages};
pub use store::TodoStore;
