use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{Priority, Status};
use crate::error::ParseError;

/// 单条任务记录
///
/// 序列化时字段使用 camelCase，与 `todos-app-data` 的存储格式保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub files: Vec<String>,
    pub links: Vec<String>,
    pub tags: Vec<String>,
    pub reminders: Vec<DateTime<Utc>>,
    pub category: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: String,
}

impl Todo {
    /// 由表单数据构建新任务，时间戳和归属信息由调用方（store）提供
    pub fn from_form(id: String, form: TodoFormData, now: DateTime<Utc>, identity: &Identity) -> Self {
        Self {
            id,
            title: form.title,
            description: form.description,
            start_time: form.start_time,
            end_time: form.end_time,
            files: form.files,
            links: form.links,
            tags: form.tags,
            reminders: form.reminders,
            category: form.category,
            priority: form.priority,
            status: form.status,
            created_at: now,
            updated_at: now,
            user_id: identity.user_id.clone(),
            user_name: identity.user_name.clone(),
            user_email: identity.user_email.clone(),
            user_avatar: identity.user_avatar.clone(),
        }
    }

    /// 把 `patch` 中为 `Some` 的字段合并到当前记录
    ///
    /// 不修改 `updated_at`，由 store 负责。
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(files) = patch.files {
            self.files = files;
        }
        if let Some(links) = patch.links {
            self.links = links;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(reminders) = patch.reminders {
            self.reminders = reminders;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// 新任务中由调用方提供的字段（已经过表单层校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFormData {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reminders: Vec<DateTime<Utc>>,
    pub category: String,
    pub priority: Priority,
    pub status: Status,
}

/// 部分更新；`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub files: Option<Vec<String>>,
    pub links: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub reminders: Option<Vec<DateTime<Utc>>>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl TodoPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 归属身份（目前只有一个静态用户）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user_id: "user-1".to_string(),
            user_name: "John Doe".to_string(),
            user_email: "john@example.com".to_string(),
            user_avatar: "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=faces"
                .to_string(),
        }
    }
}

/// 解析表单字段中的时间
///
/// 支持 RFC 3339（`2025-01-15T09:00:00Z`）、datetime-local 格式
/// （`2025-01-15T09:00`，秒可选）以及纯日期。没有时区的值按 UTC 处理。
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ParseError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::InvalidTimestamp(input.to_string()))
}
