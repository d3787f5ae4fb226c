pub mod filters;
pub mod status;
pub mod todo;

pub use filters::{FieldFilter, SortBy, SortOrder, TodoFilters, TodoStats};
pub use status::{Priority, Status};
pub use todo::{Identity, Todo, TodoFormData, TodoPatch, parse_timestamp};
