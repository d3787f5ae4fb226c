//! 任务集合的只读派生视图
//!
//! 这里都是纯函数，不会修改原始集合。

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{SortBy, SortOrder, Status, Todo, TodoFilters, TodoStats};

/// `todo` 是否通过 `filters` 的所有筛选条件（不含排序）
pub fn matches_filters(todo: &Todo, filters: &TodoFilters) -> bool {
    if !filters.search.is_empty() {
        let needle = filters.search.to_lowercase();
        let hit = todo.title.to_lowercase().contains(&needle)
            || todo.description.to_lowercase().contains(&needle)
            || todo.tags.iter().any(|tag| tag.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }

    // category 是精确匹配（区分大小写），search 不区分
    filters.status.matches(&todo.status)
        && filters.priority.matches(&todo.priority)
        && (filters.category.is_empty() || todo.category == filters.category)
}

/// 按单个排序字段比较：时间按时刻，`title` 和 `priority` 按文本
fn compare(a: &Todo, b: &Todo, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortBy::StartTime => a.start_time.cmp(&b.start_time),
        SortBy::EndTime => a.end_time.cmp(&b.end_time),
        SortBy::Priority => a.priority.as_str().cmp(b.priority.as_str()),
        SortBy::Title => a.title.cmp(&b.title),
    }
}

/// 先筛选，再排序，返回新的引用序列
///
/// 两个方向都是稳定排序：键相同的记录保持在 `todos` 中的顺序。
pub fn filter_and_sort<'a>(todos: &'a [Todo], filters: &TodoFilters) -> Vec<&'a Todo> {
    let mut filtered: Vec<&Todo> = todos
        .iter()
        .filter(|todo| matches_filters(todo, filters))
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = compare(a, b, filters.sort_by);
        match filters.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    filtered
}

/// 完整集合中的所有分类（去重，升序）
pub fn categories(todos: &[Todo]) -> Vec<&str> {
    todos
        .iter()
        .map(|todo| todo.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn stats(todos: &[Todo]) -> TodoStats {
    todos.iter().fold(
        TodoStats {
            total: todos.len(),
            ..TodoStats::default()
        },
        |mut stats, todo| {
            match todo.status {
                Status::Pending => stats.pending += 1,
                Status::Progress => stats.progress += 1,
                Status::Completed => stats.completed += 1,
                Status::Cancelled => stats.cancelled += 1,
            }
            stats
        },
    )
}

/// 判断当前数据是否看起来像内置示例数据
///
/// 只是近似判断：只比较长度以及每个位置的 `id`、`title`、`description`。
/// 修改过状态或日期的示例记录仍然算作示例数据，不要当作相等判断使用。
pub fn looks_like_seed(todos: &[Todo], seed: &[Todo]) -> bool {
    todos.len() == seed.len()
        && todos.iter().zip(seed).all(|(todo, original)| {
            todo.id == original.id
                && todo.title == original.title
                && todo.description == original.description
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldFilter, Priority};
    use crate::seed::seed_todos;
    use chrono::{Duration, TimeZone, Utc};

    fn todo(id: &str, title: &str) -> Todo {
        let mut todo = seed_todos().remove(0);
        todo.id = id.to_string();
        todo.title = title.to_string();
        todo.description = format!("about {}", title);
        todo.tags = Vec::new();
        todo
    }

    fn ids(todos: &[&Todo]) -> Vec<String> {
        todos.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_description_and_tags() {
        let mut tagged = todo("3", "Chores");
        tagged.tags = vec!["Kitchen".to_string()];
        let mut described = todo("2", "Errand");
        described.description = "Pick up MILK".to_string();
        let todos = vec![todo("1", "Buy Milk"), described, tagged, todo("4", "Walk dog")];

        let by_milk = TodoFilters {
            search: "milk".to_string(),
            ..TodoFilters::default()
        };
        let mut found = ids(&filter_and_sort(&todos, &by_milk));
        found.sort();
        assert_eq!(found, vec!["1", "2"]);

        let by_tag = TodoFilters {
            search: "kitch".to_string(),
            ..TodoFilters::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &by_tag)), vec!["3"]);
    }

    #[test]
    fn test_status_priority_and_category_are_exact() {
        let mut a = todo("a", "A");
        a.status = Status::Pending;
        a.priority = Priority::High;
        a.category = "Work".to_string();
        let mut b = todo("b", "B");
        b.status = Status::Pending;
        b.priority = Priority::Low;
        b.category = "work".to_string();
        let todos = vec![a, b];

        let filters = TodoFilters {
            status: FieldFilter::Only(Status::Pending),
            priority: FieldFilter::Only(Priority::High),
            ..TodoFilters::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["a"]);

        let filters = TodoFilters {
            category: "work".to_string(),
            ..TodoFilters::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["b"]);
    }

    #[test]
    fn test_sort_by_timestamp_both_directions() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut todos = vec![todo("mid", "m"), todo("old", "o"), todo("new", "n")];
        todos[0].start_time = base + Duration::hours(1);
        todos[1].start_time = base;
        todos[2].start_time = base + Duration::hours(2);

        let mut filters = TodoFilters {
            sort_by: SortBy::StartTime,
            sort_order: SortOrder::Asc,
            ..TodoFilters::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["old", "mid", "new"]);

        filters.sort_order = SortOrder::Desc;
        assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        // 同一条种子记录的副本，所有排序键都相同
        let todos = vec![todo("x", "t"), todo("y", "t"), todo("z", "t")];
        for sort_order in [SortOrder::Asc, SortOrder::Desc] {
            for sort_by in SortBy::ALL {
                let filters = TodoFilters {
                    sort_by,
                    sort_order,
                    ..TodoFilters::default()
                };
                assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["x", "y", "z"]);
            }
        }
    }

    #[test]
    fn test_priority_sorts_by_label() {
        let mut todos = vec![todo("m", "m"), todo("l", "l"), todo("h", "h")];
        todos[0].priority = Priority::Medium;
        todos[1].priority = Priority::Low;
        todos[2].priority = Priority::High;

        let filters = TodoFilters {
            sort_by: SortBy::Priority,
            sort_order: SortOrder::Asc,
            ..TodoFilters::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &filters)), vec!["h", "l", "m"]);
    }

    #[test]
    fn test_filtering_does_not_touch_input() {
        let todos = seed_todos();
        let filters = TodoFilters {
            sort_by: SortBy::Title,
            sort_order: SortOrder::Asc,
            ..TodoFilters::default()
        };

        let first = ids(&filter_and_sort(&todos, &filters));
        let second = ids(&filter_and_sort(&todos, &filters));
        assert_eq!(first, second);
        assert_eq!(todos, seed_todos());
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(
            categories(&seed_todos()),
            vec!["Health", "Learning", "Personal", "Work"]
        );
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_stats_over_seed() {
        let stats = stats(&seed_todos());
        assert_eq!(stats.total, 8);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.progress, 2);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(
            stats.total,
            stats.pending + stats.progress + stats.completed + stats.cancelled
        );
    }

    #[test]
    fn test_looks_like_seed_is_a_heuristic() {
        let seed = seed_todos();
        let mut edited = seed.clone();
        edited[0].status = Status::Cancelled;
        assert!(looks_like_seed(&edited, &seed));

        edited[0].title = "Changed".to_string();
        assert!(!looks_like_seed(&edited, &seed));

        assert!(!looks_like_seed(&seed[1..], &seed));
        assert!(!looks_like_seed(&[], &seed));
        assert!(looks_like_seed(&[], &[]));
    }
}
