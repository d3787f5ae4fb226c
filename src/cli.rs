use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;

use todo_store::config::{self, Config};
use todo_store::models::parse_timestamp;
use todo_store::{
    FieldFilter, Priority, SortBy, SortOrder, Status, Storages, Todo, TodoFilters, TodoFormData,
    TodoPatch, TodoStore, seed_todos,
};

/// 处理 CLI 命令
/// `args[0]` 是程序名；没有子命令时显示总览
pub fn handle_cli(args: &[String], config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        let store = open_store(config);
        return dashboard(&store);
    };
    let rest = &args[2..];

    match command.as_str() {
        "list" | "ls" => {
            let mut store = open_store(config);
            todo_list(&mut store, rest)
        }
        "show" => {
            let id = rest.first().ok_or_else(|| anyhow!("Missing todo id\nUsage: todo show <id>"))?;
            let store = open_store(config);
            todo_show(&store, id)
        }
        "add" => {
            let mut store = open_store(config);
            todo_add(&mut store, rest)
        }
        "update" | "edit" => {
            let id = rest
                .first()
                .ok_or_else(|| anyhow!("Missing todo id\nUsage: todo update <id> [flags]"))?;
            let mut store = open_store(config);
            todo_update(&mut store, id, &rest[1..])
        }
        "done" => {
            let id = rest.first().ok_or_else(|| anyhow!("Missing todo id\nUsage: todo done <id>"))?;
            let mut store = open_store(config);
            let id = resolve_id(&store, id)?;
            store.update_todo(&id, TodoPatch::status(Status::Completed));
            println!("✓ Completed todo {}", short_id(&id));
            Ok(())
        }
        "delete" | "rm" => {
            if rest.is_empty() {
                bail!("Missing todo id\nUsage: todo delete <id>...");
            }
            let mut store = open_store(config);
            todo_delete(&mut store, rest)
        }
        "stats" => {
            let store = open_store(config);
            print_stats(&store);
            Ok(())
        }
        "categories" => {
            let store = open_store(config);
            for category in store.categories() {
                println!("{}", category);
            }
            Ok(())
        }
        "filters" => {
            let mut store = open_store(config);
            match rest.first().map(|s| s.as_str()) {
                None | Some("show") => {
                    print_filters(store.filters());
                    Ok(())
                }
                Some("reset") => {
                    store.set_filters(TodoFilters::default());
                    println!("✓ Filters reset");
                    Ok(())
                }
                Some(other) => bail!("Unknown filters command: {}\nAvailable: show, reset", other),
            }
        }
        "reset" => {
            let mut store = open_store(config);
            store.reset_to_seed();
            println!("✓ Reset to sample data ({} todos)", store.all_todos().len());
            Ok(())
        }
        "clear" => {
            let mut store = open_store(config);
            store.clear_all();
            println!("✓ All todos cleared");
            Ok(())
        }
        "config" => handle_config_command(rest),
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "-v" => {
            print_version();
            Ok(())
        }
        other => bail!("Unknown command: {}\nRun 'todo --help' for usage", other),
    }
}

/// 打开数据文件并加载；存储不可用时仍然可以在内存中工作
fn open_store(config: &Config) -> TodoStore {
    let storages = Storages::open(&config.data_file);
    let mut store = TodoStore::new(seed_todos(), config.identity.clone());
    store.hydrate(storages.local);
    store
}

// ============================================================================
// 参数解析
// ============================================================================

/// 取 `flag` 后面的值；flag 存在但缺少值时报错
fn parse_flag(args: &[String], flag: &str) -> Result<Option<String>> {
    let Some(i) = args.iter().position(|s| s == flag) else {
        return Ok(None);
    };
    match args.get(i + 1) {
        Some(value) if !value.starts_with("--") => Ok(Some(value.clone())),
        _ => bail!("{} requires a value", flag),
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|s| s == flag)
}

/// 逗号分隔的列表，忽略空项
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_time_list(value: &str) -> Result<Vec<DateTime<Utc>>> {
    parse_list(value)
        .iter()
        .map(|item| parse_timestamp(item).map_err(anyhow::Error::from))
        .collect()
}

fn required(args: &[String], flag: &str) -> Result<String> {
    match parse_flag(args, flag)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} is required", flag),
    }
}

/// 表单层：校验必填字段并转换成 `TodoFormData`
fn build_form(args: &[String], now: DateTime<Utc>) -> Result<TodoFormData> {
    let title = required(args, "--title")?;
    let description = required(args, "--description")?;
    let category = required(args, "--category")?;

    let start_time = match parse_flag(args, "--start")? {
        Some(value) => parse_timestamp(&value)?,
        None => now,
    };
    let end_time = match parse_flag(args, "--end")? {
        Some(value) => parse_timestamp(&value)?,
        None => start_time + Duration::hours(1),
    };

    Ok(TodoFormData {
        title,
        description,
        start_time,
        end_time,
        files: parse_flag(args, "--files")?.map(|v| parse_list(&v)).unwrap_or_default(),
        links: parse_flag(args, "--links")?.map(|v| parse_list(&v)).unwrap_or_default(),
        tags: parse_flag(args, "--tags")?.map(|v| parse_list(&v)).unwrap_or_default(),
        reminders: match parse_flag(args, "--reminders")? {
            Some(value) => parse_time_list(&value)?,
            None => Vec::new(),
        },
        category,
        priority: match parse_flag(args, "--priority")? {
            Some(value) => value.parse::<Priority>()?,
            None => Priority::Medium,
        },
        status: match parse_flag(args, "--status")? {
            Some(value) => value.parse::<Status>()?,
            None => Status::Pending,
        },
    })
}

fn non_empty(args: &[String], flag: &str) -> Result<Option<String>> {
    match parse_flag(args, flag)? {
        Some(value) if value.trim().is_empty() => bail!("{} cannot be empty", flag),
        other => Ok(other),
    }
}

fn build_patch(args: &[String]) -> Result<TodoPatch> {
    Ok(TodoPatch {
        title: non_empty(args, "--title")?,
        description: non_empty(args, "--description")?,
        start_time: parse_flag(args, "--start")?.map(|v| parse_timestamp(&v)).transpose()?,
        end_time: parse_flag(args, "--end")?.map(|v| parse_timestamp(&v)).transpose()?,
        files: parse_flag(args, "--files")?.map(|v| parse_list(&v)),
        links: parse_flag(args, "--links")?.map(|v| parse_list(&v)),
        tags: parse_flag(args, "--tags")?.map(|v| parse_list(&v)),
        reminders: parse_flag(args, "--reminders")?.map(|v| parse_time_list(&v)).transpose()?,
        category: non_empty(args, "--category")?,
        priority: parse_flag(args, "--priority")?.map(|v| v.parse::<Priority>()).transpose()?,
        status: parse_flag(args, "--status")?.map(|v| v.parse::<Status>()).transpose()?,
    })
}

/// 把命令行中的筛选参数应用到 `current` 上
/// 没有任何筛选参数时返回 `None`
fn filters_from_flags(args: &[String], current: &TodoFilters) -> Result<Option<TodoFilters>> {
    if has_flag(args, "--reset") {
        return Ok(Some(TodoFilters::default()));
    }

    let mut filters = current.clone();
    let mut changed = false;

    if let Some(search) = parse_flag(args, "--search")? {
        filters.search = search;
        changed = true;
    }
    if let Some(status) = parse_flag(args, "--status")? {
        filters.status = status.parse::<FieldFilter<Status>>()?;
        changed = true;
    }
    if let Some(priority) = parse_flag(args, "--priority")? {
        filters.priority = priority.parse::<FieldFilter<Priority>>()?;
        changed = true;
    }
    if let Some(category) = parse_flag(args, "--category")? {
        filters.category = category;
        changed = true;
    }
    if let Some(sort_by) = parse_flag(args, "--sort")? {
        filters.sort_by = sort_by.parse::<SortBy>()?;
        changed = true;
    }
    if let Some(order) = parse_flag(args, "--order")? {
        filters.sort_order = order.parse::<SortOrder>()?;
        changed = true;
    }

    Ok(changed.then_some(filters))
}

/// 完整 id，或者唯一匹配的 id 前缀
fn resolve_id(store: &TodoStore, input: &str) -> Result<String> {
    if let Some(todo) = store.get_by_id(input) {
        return Ok(todo.id.clone());
    }

    let matches: Vec<&Todo> = store
        .all_todos()
        .iter()
        .filter(|t| t.id.starts_with(input))
        .collect();

    match matches.as_slice() {
        [todo] => Ok(todo.id.clone()),
        [] => bail!("Todo '{}' not found", input),
        _ => bail!("Todo id '{}' is ambiguous ({} matches)", input, matches.len()),
    }
}

// ============================================================================
// 命令
// ============================================================================

fn dashboard(store: &TodoStore) -> Result<()> {
    println!("Todo Overview\n");
    print_stats(store);
    println!();

    let todos = store.todos();
    print_table(&todos);
    println!("\nShowing {} of {} todos", todos.len(), store.all_todos().len());

    if store.is_using_seed_data() {
        println!("Using sample data. Run 'todo clear' to start with an empty list.");
    }

    Ok(())
}

fn todo_list(store: &mut TodoStore, args: &[String]) -> Result<()> {
    if let Some(filters) = filters_from_flags(args, store.filters())? {
        store.set_filters(filters);
    }

    let todos = store.todos();
    if todos.is_empty() {
        if store.all_todos().is_empty() {
            println!("No todos found. Get started with 'todo add'.");
        } else {
            println!("No todos found. Try adjusting your filters or search terms.");
        }
        return Ok(());
    }

    print_table(&todos);
    println!("\nShowing {} of {} todos", todos.len(), store.all_todos().len());

    Ok(())
}

fn todo_show(store: &TodoStore, id: &str) -> Result<()> {
    let id = resolve_id(store, id)?;
    let todo = store
        .get_by_id(&id)
        .ok_or_else(|| anyhow!("Todo '{}' not found", id))?;

    println!("Todo {}", todo.id);
    println!("Title: {}", todo.title);
    println!("Status: {}", todo.status.display());
    println!("Priority: {}", todo.priority);
    println!("Category: {}", todo.category);
    println!("Start: {}", format_time(&todo.start_time));
    println!("End: {}", format_time(&todo.end_time));
    println!("Tags: {}", join_or_dash(&todo.tags));
    println!("Links: {}", join_or_dash(&todo.links));
    println!("Files: {}", join_or_dash(&todo.files));
    let reminders: Vec<String> = todo.reminders.iter().map(format_time).collect();
    println!("Reminders: {}", join_or_dash(&reminders));
    println!("Owner: {} <{}>", todo.user_name, todo.user_email);
    println!("Created: {}", format_time(&todo.created_at));
    println!("Updated: {}", format_time(&todo.updated_at));
    println!("\n{}", todo.description);

    Ok(())
}

fn todo_add(store: &mut TodoStore, args: &[String]) -> Result<()> {
    let form = build_form(args, Utc::now()).context("Usage: todo add --title <t> --description <d> --category <c> [flags]")?;
    let todo = store.create_todo(form);

    println!("✓ Created todo {}", short_id(&todo.id));
    println!("  {}", todo.title);

    Ok(())
}

fn todo_update(store: &mut TodoStore, id: &str, args: &[String]) -> Result<()> {
    let id = resolve_id(store, id)?;
    let patch = build_patch(args)?;

    if patch.is_empty() {
        println!("No changes made to todo {}", short_id(&id));
        return Ok(());
    }

    store.update_todo(&id, patch);
    println!("✓ Updated todo {}", short_id(&id));

    Ok(())
}

fn todo_delete(store: &mut TodoStore, inputs: &[String]) -> Result<()> {
    let ids = inputs
        .iter()
        .map(|input| resolve_id(store, input))
        .collect::<Result<Vec<_>>>()?;

    let removed = delete_resolved(store, &ids);
    println!("✓ Deleted {} todo{}", removed, if removed == 1 { "" } else { "s" });

    Ok(())
}

/// 同一条记录可能被多个前缀匹配到，按实际删除数量计数
fn delete_resolved(store: &mut TodoStore, ids: &[String]) -> usize {
    let before = store.all_todos().len();
    store.delete_multiple(ids);
    before - store.all_todos().len()
}

fn handle_config_command(args: &[String]) -> Result<()> {
    match args.first().map(|s| s.as_str()) {
        None | Some("show") => config::show_config(),
        Some("data-file") => {
            let path = args
                .get(1)
                .ok_or_else(|| anyhow!("Usage: todo config data-file <path>"))?;
            config::set_data_file(PathBuf::from(path))
        }
        Some("user") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow!("Usage: todo config user <name> [--email <email>]"))?;
            config::set_user(name.clone(), parse_flag(&args[2..], "--email")?)
        }
        Some(other) => bail!("Unknown config option: {}\nAvailable: show, data-file, user", other),
    }
}

// ============================================================================
// 输出
// ============================================================================

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    }
}

fn print_table(todos: &[&Todo]) {
    println!("ID        TITLE                               STATUS     PRIORITY  CATEGORY      START             TAGS");
    println!("--------  ----------------------------------  ---------  --------  ------------  ----------------  --------");

    for todo in todos {
        println!(
            "{:<8}  {:<34}  {:<9}  {:<8}  {:<12}  {:<16}  {}",
            short_id(&todo.id),
            truncate(&todo.title, 34),
            todo.status,
            todo.priority,
            truncate(&todo.category, 12),
            format_time(&todo.start_time),
            truncate(&join_or_dash(&todo.tags), 24)
        );
    }
}

fn print_stats(store: &TodoStore) {
    let stats = store.stats();
    println!("Total: {}  Pending: {}  In Progress: {}  Completed: {}  Cancelled: {}",
        stats.total, stats.pending, stats.progress, stats.completed, stats.cancelled);
    println!(
        "Completion rate: {}% ({} of {} completed)",
        stats.completion_rate(),
        stats.completed,
        stats.total
    );
    println!(
        "Progress rate: {}% ({} of {} started or completed)",
        stats.progress_rate(),
        stats.completed + stats.progress,
        stats.total
    );
}

fn print_filters(filters: &TodoFilters) {
    println!("Current filters:");
    println!("  search:    {}", if filters.search.is_empty() { "-" } else { filters.search.as_str() });
    println!("  status:    {}", filters.status);
    println!("  priority:  {}", filters.priority);
    println!("  category:  {}", if filters.category.is_empty() { "-" } else { filters.category.as_str() });
    println!("  sort:      {} {}", filters.sort_by, filters.sort_order);
}

/// 打印帮助信息
fn print_help() {
    println!("todo - local to-do list manager

USAGE:
    todo                      Show the overview (stats + filtered list)
    todo <COMMAND> [ARGS]

COMMANDS:
    list [--search <s>] [--status <st|all>] [--priority <p|all>]
         [--category <c>] [--sort <field>] [--order asc|desc] [--reset]
        List todos; given filters are saved for next time

    show <id>
        Show todo details

    add --title <t> --description <d> --category <c>
        [--start <time>] [--end <time>] [--priority low|medium|high]
        [--status pending|progress|completed|cancelled]
        [--tags a,b] [--links u,v] [--files u,v] [--reminders t1,t2]
        Create a todo (defaults: medium, pending, start now, end +1h)

    update <id> [same flags as add, all optional]
        Update todo fields

    done <id>                 Mark a todo as completed
    delete <id>...            Delete one or more todos
    stats                     Show counts by status
    categories                List categories
    filters [show|reset]      Show or reset the saved filters
    reset                     Replace all todos with the sample data
    clear                     Delete all todos
    config [show]             Show configuration
    config data-file <path>   Set the data file location
    config user <name> [--email <e>]
                              Set the owner of new todos

Ids can be shortened to any unambiguous prefix.
Times accept RFC 3339, 'YYYY-MM-DDTHH:MM' or 'YYYY-MM-DD' (UTC).

SORT FIELDS:
    createdAt, updatedAt, startTime, endTime, priority, title

EXAMPLES:
    todo add --title \"Buy milk\" --description \"2 litres\" --category errand --priority low
    todo list --status pending --sort endTime --order asc
    todo list --search milk
    todo done 3f2a");
}

/// 打印版本信息
fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");
    println!("{} {}", NAME, VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use todo_store::Identity;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_build_form_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let form = build_form(
            &args(&["--title", "Buy milk", "--description", "2 litres", "--category", "errand"]),
            now,
        )
        .unwrap();

        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(form.status, Status::Pending);
        assert_eq!(form.start_time, now);
        assert_eq!(form.end_time, now + Duration::hours(1));
        assert!(form.tags.is_empty());
    }

    #[test]
    fn test_build_form_requires_fields() {
        let now = Utc::now();
        assert!(build_form(&args(&["--title", "x", "--category", "c"]), now).is_err());
        assert!(build_form(&args(&["--title", " ", "--description", "d", "--category", "c"]), now).is_err());
        assert!(
            build_form(
                &args(&["--title", "t", "--description", "d", "--category", "c", "--priority", "urgent"]),
                now
            )
            .is_err()
        );
    }

    #[test]
    fn test_build_patch() {
        let patch = build_patch(&args(&["--status", "completed", "--tags", "x,y"])).unwrap();
        assert_eq!(patch.status, Some(Status::Completed));
        assert_eq!(patch.tags, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(patch.title, None);

        assert!(build_patch(&[]).unwrap().is_empty());
        assert!(build_patch(&args(&["--title", ""])).is_err());
    }

    #[test]
    fn test_filters_from_flags() {
        let current = TodoFilters {
            search: "milk".to_string(),
            ..TodoFilters::default()
        };

        assert_eq!(filters_from_flags(&[], &current).unwrap(), None);

        let updated = filters_from_flags(&args(&["--status", "pending", "--order", "asc"]), &current)
            .unwrap()
            .unwrap();
        assert_eq!(updated.search, "milk");
        assert_eq!(updated.status, FieldFilter::Only(Status::Pending));
        assert_eq!(updated.sort_order, SortOrder::Asc);

        let reset = filters_from_flags(&args(&["--reset"]), &current).unwrap();
        assert_eq!(reset, Some(TodoFilters::default()));

        assert!(filters_from_flags(&args(&["--sort", "color"]), &current).is_err());
    }

    #[test]
    fn test_resolve_id() {
        let mut store = TodoStore::new(seed_todos(), Identity::default());
        let created = store.create_todo(
            build_form(&args(&["--title", "t", "--description", "d", "--category", "c"]), Utc::now()).unwrap(),
        );

        assert_eq!(resolve_id(&store, "3").unwrap(), "3");
        assert_eq!(resolve_id(&store, &created.id[..12]).unwrap(), created.id);
        assert!(resolve_id(&store, "missing").is_err());
    }

    #[test]
    fn test_parse_flag_requires_a_value() {
        assert_eq!(parse_flag(&args(&["--status", "pending"]), "--status").unwrap(), Some("pending".to_string()));
        assert_eq!(parse_flag(&args(&["--order", "asc"]), "--status").unwrap(), None);

        assert!(parse_flag(&args(&["--status"]), "--status").is_err());
        assert!(parse_flag(&args(&["--title", "--description", "d"]), "--title").is_err());
        assert!(filters_from_flags(&args(&["--status"]), &TodoFilters::default()).is_err());
        assert!(build_form(&args(&["--title", "--description", "d", "--category", "c"]), Utc::now()).is_err());
    }

    #[test]
    fn test_delete_counts_removed_records() {
        let mut store = TodoStore::new(seed_todos(), Identity::default());
        let ids = vec![
            resolve_id(&store, "1").unwrap(),
            resolve_id(&store, "1").unwrap(),
            resolve_id(&store, "2").unwrap(),
        ];

        assert_eq!(delete_resolved(&mut store, &ids), 2);
        assert_eq!(store.all_todos().len(), 6);
        assert_eq!(delete_resolved(&mut store, &ids), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }
}
