/// 内置示例数据（首次运行和“重置”时使用）
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Identity, Priority, Status, Todo};

/// 示例数据的固定时间点；日期非法时回退到 epoch（下面的字面量不会出现这种情况）
fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct SeedRecord {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    priority: Priority,
    status: Status,
    tags: &'static [&'static str],
    links: &'static [&'static str],
    files: &'static [&'static str],
    /// 2025 年 1 月的（日, 时）
    start: (u32, u32),
    end: (u32, u32),
    created: (u32, u32),
    updated: (u32, u32),
}

const RECORDS: &[SeedRecord] = &[
    SeedRecord {
        id: "1",
        title: "Complete project proposal",
        description: "Write and submit the Q1 project proposal including budget estimates and timeline.",
        category: "Work",
        priority: Priority::High,
        status: Status::Progress,
        tags: &["proposal", "planning", "q1"],
        links: &["https://docs.example.com/proposal-template"],
        files: &["https://files.example.com/budget-2025.xlsx"],
        start: (6, 9),
        end: (10, 17),
        created: (5, 8),
        updated: (7, 14),
    },
    SeedRecord {
        id: "2",
        title: "Grocery shopping",
        description: "Buy vegetables, fruit, milk and bread for the week.",
        category: "Personal",
        priority: Priority::Medium,
        status: Status::Pending,
        tags: &["shopping", "weekly"],
        links: &[],
        files: &[],
        start: (11, 10),
        end: (11, 12),
        created: (6, 19),
        updated: (6, 19),
    },
    SeedRecord {
        id: "3",
        title: "Team standup meeting",
        description: "Daily sync with the development team about sprint progress and blockers.",
        category: "Work",
        priority: Priority::Medium,
        status: Status::Completed,
        tags: &["meeting", "team"],
        links: &["https://meet.example.com/standup"],
        files: &[],
        start: (7, 9),
        end: (7, 10),
        created: (3, 16),
        updated: (7, 10),
    },
    SeedRecord {
        id: "4",
        title: "Dentist appointment",
        description: "Routine check-up and cleaning at the downtown clinic.",
        category: "Health",
        priority: Priority::High,
        status: Status::Pending,
        tags: &["health", "appointment"],
        links: &[],
        files: &[],
        start: (14, 15),
        end: (14, 16),
        created: (2, 11),
        updated: (2, 11),
    },
    SeedRecord {
        id: "5",
        title: "Read design patterns book",
        description: "Finish the chapters on structural patterns and take notes.",
        category: "Learning",
        priority: Priority::Low,
        status: Status::Progress,
        tags: &["reading", "books", "self-improvement"],
        links: &["https://books.example.com/design-patterns"],
        files: &[],
        start: (1, 20),
        end: (31, 22),
        created: (1, 20),
        updated: (8, 21),
    },
    SeedRecord {
        id: "6",
        title: "Renew gym membership",
        description: "Membership expires at the end of the month; compare yearly plans first.",
        category: "Health",
        priority: Priority::Low,
        status: Status::Cancelled,
        tags: &["fitness"],
        links: &[],
        files: &[],
        start: (20, 18),
        end: (20, 19),
        created: (4, 7),
        updated: (9, 12),
    },
    SeedRecord {
        id: "7",
        title: "Fix login page bug",
        description: "Users on mobile cannot submit the login form when autofill is used.",
        category: "Work",
        priority: Priority::High,
        status: Status::Pending,
        tags: &["bug", "frontend", "urgent"],
        links: &["https://issues.example.com/1423"],
        files: &["https://files.example.com/login-repro.mp4"],
        start: (9, 9),
        end: (9, 18),
        created: (8, 17),
        updated: (8, 17),
    },
    SeedRecord {
        id: "8",
        title: "Plan weekend trip",
        description: "Pick a destination, book accommodation and plan the route.",
        category: "Personal",
        priority: Priority::Medium,
        status: Status::Completed,
        tags: &["travel", "weekend"],
        links: &["https://maps.example.com"],
        files: &[],
        start: (17, 8),
        end: (19, 20),
        created: (2, 9),
        updated: (5, 22),
    },
];

/// 构建示例数据集
///
/// 每次调用都返回新的副本；store 自己保存一份且不会修改它。
pub fn seed_todos() -> Vec<Todo> {
    let identity = Identity::default();

    RECORDS
        .iter()
        .map(|r| Todo {
            id: r.id.to_string(),
            title: r.title.to_string(),
            description: r.description.to_string(),
            start_time: at(2025, 1, r.start.0, r.start.1, 0),
            end_time: at(2025, 1, r.end.0, r.end.1, 0),
            files: strings(r.files),
            links: strings(r.links),
            tags: strings(r.tags),
            reminders: vec![at(2025, 1, r.start.0, r.start.1, 0) - chrono::Duration::minutes(30)],
            category: r.category.to_string(),
            priority: r.priority,
            status: r.status,
            created_at: at(2025, 1, r.created.0, r.created.1, 0),
            updated_at: at(2025, 1, r.updated.0, r.updated.1, 0),
            user_id: identity.user_id.clone(),
            user_name: identity.user_name.clone(),
            user_email: identity.user_email.clone(),
            user_avatar: identity.user_avatar.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = seed_todos();
        let ids: HashSet<_> = seed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), seed.len());
    }

    #[test]
    fn test_seed_is_well_formed() {
        for todo in seed_todos() {
            assert!(!todo.title.is_empty());
            assert!(!todo.description.is_empty());
            assert!(todo.start_time <= todo.end_time, "{}", todo.id);
            assert!(todo.created_at <= todo.updated_at, "{}", todo.id);
        }
    }

    #[test]
    fn test_seed_covers_every_status() {
        let seed = seed_todos();
        for status in Status::ALL {
            assert!(seed.iter().any(|t| t.status == status), "{}", status);
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(seed_todos(), seed_todos());
    }
}
