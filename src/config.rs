/// 应用配置管理
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Identity;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "TODO_STORE_CONFIG";

const APP_DIR: &str = "todo-store";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 持久化存储文件（JSON 键值文件）
    pub data_file: PathBuf,
    /// 新任务的归属身份
    pub identity: Identity,
    /// 默认日志级别（RUST_LOG 优先）
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            identity: Identity::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// 用户主目录下的回退目录（~/.todo-store）
fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(format!(".{}", APP_DIR)))
        .unwrap_or_else(|_| PathBuf::from(format!(".{}", APP_DIR)))
}

/// 获取默认数据文件路径
/// Windows: %APPDATA%\todo-store\storage.json
/// macOS: ~/Library/Application Support/todo-store/storage.json
/// Linux: ~/.local/share/todo-store/storage.json
pub fn default_data_file() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.data_dir().join(APP_DIR))
        .unwrap_or_else(home_fallback)
        .join("storage.json")
}

/// 获取配置文件路径
/// `$TODO_STORE_CONFIG` 优先，否则使用平台配置目录:
/// Linux: ~/.config/todo-store/config.toml
pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(APP_DIR))
        .unwrap_or_else(home_fallback)
        .join("config.toml")
}

/// 加载配置
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // 配置文件不存在，返回默认配置
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;

    Ok(config)
}

/// 保存配置
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(&get_config_path(), config)
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;

    Ok(())
}

/// 更新数据文件位置
pub fn set_data_file(path: PathBuf) -> Result<()> {
    let mut config = load_config()?;
    config.data_file = path;
    save_config(&config)?;
    println!("✓ Data file set to: {}", config.data_file.display());
    Ok(())
}

/// 更新归属用户
pub fn set_user(name: String, email: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    config.identity.user_name = name;
    if let Some(email) = email {
        config.identity.user_email = email;
    }
    save_config(&config)?;
    println!(
        "✓ User set to: {} <{}>",
        config.identity.user_name, config.identity.user_email
    );
    Ok(())
}

/// 显示当前配置
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    println!("Current configuration:");
    println!("  Data file:  {}", config.data_file.display());
    println!(
        "  User:       {} <{}> ({})",
        config.identity.user_name, config.identity.user_email, config.identity.user_id
    );
    println!("  Log level:  {}", config.log_level);
    println!();
    println!("Config file: {}", get_config_path().display());
    Ok(())
}
