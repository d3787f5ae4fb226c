pub mod persist;
pub mod view;

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Identity, Todo, TodoFilters, TodoFormData, TodoPatch, TodoStats};
use crate::storage::SafeStorage;

pub use persist::{FILTERS_STORAGE_KEY, TODOS_STORAGE_KEY};

/// 存储的生命周期：加载完成之前不允许写入
#[derive(Debug)]
enum Hydration {
    /// 只有内置默认值，尚未读取存储
    Uninitialized,
    /// 已加载；之后的修改都通过这个句柄写入
    Ready(SafeStorage),
}

/// 任务集合与筛选条件的唯一数据源
///
/// 构造时不访问存储。存储可达后调用 [`TodoStore::hydrate`]；在此之前的修改
/// 只保存在内存中，内置默认值不会覆盖之前保存的数据。
#[derive(Debug)]
pub struct TodoStore {
    todos: Vec<Todo>,
    filters: TodoFilters,
    seed: Vec<Todo>,
    identity: Identity,
    hydration: Hydration,
}

impl TodoStore {
    pub fn new(seed: Vec<Todo>, identity: Identity) -> Self {
        Self {
            todos: seed.clone(),
            filters: TodoFilters::default(),
            seed,
            identity,
            hydration: Hydration::Uninitialized,
        }
    }

    /// 加载一次已保存的状态，之后开始持久化修改
    ///
    /// 已保存的值替换内存中的默认值，缺失或格式错误时保留默认值。
    /// 存储不可达时不做任何事；加载完成后再次调用会被忽略。
    pub fn hydrate(&mut self, storage: SafeStorage) {
        if self.is_hydrated() {
            debug!(storage = storage.name(), "already hydrated, ignoring");
            return;
        }
        // 存储不可达时保持未加载状态，等待下一次可用的存储
        if !storage.is_available() {
            debug!(storage = storage.name(), "storage not reachable, staying uninitialized");
            return;
        }

        let restored = match persist::load_todos(&storage) {
            Some(todos) => {
                self.todos = todos;
                true
            }
            None => false,
        };
        if let Some(filters) = persist::load_filters(&storage) {
            self.filters = filters;
        }

        debug!(
            storage = storage.name(),
            restored,
            count = self.todos.len(),
            "hydrated todo store"
        );

        // 没有已保存的数据时，立即写入当前（默认）数据
        if !restored {
            persist::save_todos(&storage, &self.todos);
        }
        persist::save_filters(&storage, &self.filters);

        self.hydration = Hydration::Ready(storage);
    }

    pub fn is_hydrated(&self) -> bool {
        matches!(self.hydration, Hydration::Ready(_))
    }

    fn flush_todos(&self) {
        if let Hydration::Ready(storage) = &self.hydration {
            persist::save_todos(storage, &self.todos);
        }
    }

    fn flush_filters(&self) {
        if let Hydration::Ready(storage) = &self.hydration {
            persist::save_filters(storage, &self.filters);
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get_by_id(&id).is_none() {
                return id;
            }
        }
    }

    /// 由表单数据创建任务，放在最前面
    pub fn create_todo(&mut self, form: TodoFormData) -> Todo {
        let todo = Todo::from_form(self.fresh_id(), form, Utc::now(), &self.identity);
        self.todos.insert(0, todo.clone());
        debug!(id = %todo.id, "created todo");
        self.flush_todos();
        todo
    }

    /// 把 `patch` 合并到 `id` 对应的任务
    ///
    /// id 不存在时什么都不做；返回值只表示是否有修改。
    pub fn update_todo(&mut self, id: &str, patch: TodoPatch) -> bool {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update of unknown todo ignored");
            return false;
        };

        todo.apply(patch);
        todo.updated_at = next_timestamp(todo.updated_at);
        self.flush_todos();
        true
    }

    pub fn delete_todo(&mut self, id: &str) {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        if self.todos.len() != before {
            self.flush_todos();
        }
    }

    /// 删除 `ids` 中的所有任务，不存在的 id 忽略
    pub fn delete_multiple<S: AsRef<str>>(&mut self, ids: &[S]) {
        let ids: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        let before = self.todos.len();
        self.todos.retain(|t| !ids.contains(t.id.as_str()));
        if self.todos.len() != before {
            self.flush_todos();
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// 用内置示例数据替换整个集合
    pub fn reset_to_seed(&mut self) {
        self.todos = self.seed.clone();
        self.flush_todos();
    }

    pub fn clear_all(&mut self) {
        self.todos.clear();
        self.flush_todos();
    }

    /// 整体替换筛选配置
    pub fn set_filters(&mut self, filters: TodoFilters) {
        self.filters = filters;
        self.flush_filters();
    }

    pub fn filters(&self) -> &TodoFilters {
        &self.filters
    }

    /// 完整的、未经筛选的集合
    pub fn all_todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn seed(&self) -> &[Todo] {
        &self.seed
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// 按当前筛选条件筛选并排序后的集合
    pub fn todos(&self) -> Vec<&Todo> {
        view::filter_and_sort(&self.todos, &self.filters)
    }

    pub fn categories(&self) -> Vec<&str> {
        view::categories(&self.todos)
    }

    pub fn stats(&self) -> TodoStats {
        view::stats(&self.todos)
    }

    /// 见 [`view::looks_like_seed`]，只是近似判断
    pub fn is_using_seed_data(&self) -> bool {
        view::looks_like_seed(&self.todos, &self.seed)
    }
}

/// 返回当前时间；时钟没有超过 `previous` 时返回 `previous` + 1 毫秒
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
