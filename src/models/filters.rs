use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::status::{Priority, Status};
use crate::error::ParseError;

/// `all`（不过滤）或者某一个具体值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFilter<T> {
    All,
    Only(T),
}

impl<T> Default for FieldFilter<T> {
    fn default() -> Self {
        FieldFilter::All
    }
}

impl<T: PartialEq> FieldFilter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::Only(expected) => expected == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for FieldFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFilter::All => f.write_str("all"),
            FieldFilter::Only(value) => write!(f, "{}", value),
        }
    }
}

impl<T: FromStr> FromStr for FieldFilter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(FieldFilter::All)
        } else {
            s.parse().map(FieldFilter::Only)
        }
    }
}

impl<T: fmt::Display> Serialize for FieldFilter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for FieldFilter<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    StartTime,
    EndTime,
    Priority,
    Title,
}

impl SortBy {
    pub const ALL: [SortBy; 6] = [
        SortBy::CreatedAt,
        SortBy::UpdatedAt,
        SortBy::StartTime,
        SortBy::EndTime,
        SortBy::Priority,
        SortBy::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::UpdatedAt => "updatedAt",
            SortBy::StartTime => "startTime",
            SortBy::EndTime => "endTime",
            SortBy::Priority => "priority",
            SortBy::Title => "title",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ParseError::UnknownSortBy(s.to_string()))
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseError::UnknownSortOrder(s.to_string())),
        }
    }
}

/// 当前的筛选与排序配置
///
/// 总是整体替换，没有部分更新。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoFilters {
    /// 不区分大小写的子串匹配；为空时不过滤
    pub search: String,
    pub status: FieldFilter<Status>,
    pub priority: FieldFilter<Priority>,
    /// 精确匹配；为空时不过滤
    pub category: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// 按状态统计的数量（总是基于完整集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TodoStats {
    pub total: usize,
    pub pending: usize,
    pub progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl TodoStats {
    /// 完成率（百分比，四舍五入）
    pub fn completion_rate(&self) -> u32 {
        percentage(self.completed, self.total)
    }

    /// 推进率：已完成 + 进行中
    pub fn progress_rate(&self) -> u32 {
        percentage(self.completed + self.progress, self.total)
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
