use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Todo, TodoFilters};
use crate::storage::SafeStorage;

/// 任务列表（JSON 数组）的键
pub const TODOS_STORAGE_KEY: &str = "todos-app-data";
/// 筛选配置（JSON）的键
pub const FILTERS_STORAGE_KEY: &str = "todos-app-filters";

/// 读取并解析一个键；缺失、为空或格式错误都视为“没有数据”
fn load<T: DeserializeOwned>(storage: &SafeStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    if raw.is_empty() {
        return None;
    }

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(storage = storage.name(), key, error = %e, "failed to load data, using defaults");
            None
        }
    }
}

fn save<T: Serialize + ?Sized>(storage: &SafeStorage, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => {
            let saved = storage.set(key, &json);
            debug!(storage = storage.name(), key, bytes = json.len(), saved, "flushed");
            saved
        }
        Err(e) => {
            warn!(storage = storage.name(), key, error = %e, "failed to serialize data");
            false
        }
    }
}

pub fn load_todos(storage: &SafeStorage) -> Option<Vec<Todo>> {
    load(storage, TODOS_STORAGE_KEY)
}

pub fn load_filters(storage: &SafeStorage) -> Option<TodoFilters> {
    load(storage, FILTERS_STORAGE_KEY)
}

pub fn save_todos(storage: &SafeStorage, todos: &[Todo]) -> bool {
    save(storage, TODOS_STORAGE_KEY, todos)
}

pub fn save_filters(storage: &SafeStorage, filters: &TodoFilters) -> bool {
    save(storage, FILTERS_STORAGE_KEY, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldFilter, Priority, SortBy};
    use crate::seed::seed_todos;
    use crate::storage::MemoryStore;

    #[test]
    fn test_todos_round_trip() {
        let storage = SafeStorage::new("local", MemoryStore::new());
        let todos = seed_todos();

        assert!(save_todos(&storage, &todos));
        assert_eq!(load_todos(&storage), Some(todos));
    }

    #[test]
    fn test_filters_round_trip() {
        let storage = SafeStorage::new("local", MemoryStore::new());
        let filters = TodoFilters {
            search: "milk".to_string(),
            priority: FieldFilter::Only(Priority::High),
            sort_by: SortBy::Title,
            ..TodoFilters::default()
        };

        assert!(save_filters(&storage, &filters));
        assert_eq!(load_filters(&storage), Some(filters));
    }

    #[test]
    fn test_missing_and_empty_values_are_no_data() {
        let store = MemoryStore::new();
        let storage = SafeStorage::new("local", store.clone());
        assert_eq!(load_todos(&storage), None);

        storage.set(TODOS_STORAGE_KEY, "");
        assert_eq!(load_todos(&storage), None);
    }

    #[test]
    fn test_malformed_json_is_no_data() {
        let storage = SafeStorage::new("local", MemoryStore::new());
        storage.set(TODOS_STORAGE_KEY, "[{\"id\": ");
        storage.set(FILTERS_STORAGE_KEY, "not json");

        assert_eq!(load_todos(&storage), None);
        assert_eq!(load_filters(&storage), None);
    }

    #[test]
    fn test_unknown_status_is_rejected_on_load() {
        let storage = SafeStorage::new("local", MemoryStore::new());
        let mut json = serde_json::to_value(seed_todos()).unwrap();
        json[0]["status"] = serde_json::Value::from("archived");
        storage.set(TODOS_STORAGE_KEY, &json.to_string());

        assert_eq!(load_todos(&storage), None);
    }

    #[test]
    fn test_dates_accept_other_iso_offsets() {
        let storage = SafeStorage::new("local", MemoryStore::new());
        let mut json = serde_json::to_value(&seed_todos()[..1]).unwrap();
        json[0]["startTime"] = serde_json::Value::from("2025-01-06T11:00:00.000+02:00");
        storage.set(TODOS_STORAGE_KEY, &json.to_string());

        let loaded = load_todos(&storage).unwrap();
        assert_eq!(loaded[0].start_time, seed_todos()[0].start_time);
    }
}
