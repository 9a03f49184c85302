use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 提交存储数据库连接配置
/// - logging: 日志配置
/// - api: 管理接口令牌
/// - routes: 路由前缀
/// - attribution: 归因采集、同意、报表和保留期配置
///
/// 配置在启动时加载一次，之后以不可变值的形式传入各组件。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub attribution: AttributionConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：LI，分隔符：__
    /// 示例：LI__ATTRIBUTION__TOP_N=5
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let explicit = path.is_some();
        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（显式指定时必须存在）
            .add_source(File::with_name(path).required(explicit))
            // 2. 从环境变量覆盖，前缀 LI，分隔符 __
            .add_source(
                Environment::with_prefix("LI")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 管理接口配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// 报表接口的 Bearer 令牌，为空时报表接口关闭
    #[serde(default)]
    pub admin_token: String,
}

/// 路由前缀配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_forms_prefix")]
    pub forms_prefix: String,
}

/// 定时清理频率
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PruneSchedule {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// 归因配置
///
/// 对应站点设置中的 General / Consent / Reporting / Retention 四组选项。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 提交记录中保存归因快照的字段名
    #[serde(default = "default_attribution_key")]
    pub attribution_key: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_cookie_ttl_days")]
    pub cookie_ttl_days: i64,

    #[serde(default = "default_true")]
    pub consent_required: bool,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub consent_cookie_name: Option<String>,
    /// 为空时只检查同意 cookie 是否存在
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub consent_cookie_value: Option<String>,
    #[serde(default = "default_true")]
    pub store_landing_without_consent: bool,
    #[serde(default)]
    pub store_referrer_without_consent: bool,

    #[serde(default = "default_top_n")]
    pub top_n: i64,
    #[serde(default = "default_date_range_days")]
    pub default_date_range_days: i64,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default)]
    pub prune_schedule_enabled: bool,
    #[serde(default)]
    pub prune_schedule: PruneSchedule,
    /// HH:MM (UTC)
    #[serde(default = "default_prune_schedule_time")]
    pub prune_schedule_time: String,
}

impl AttributionConfig {
    /// 解析定时清理时间，格式错误时回退到 03:00
    pub fn schedule_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(self.prune_schedule_time.trim(), "%H:%M").unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid prune_schedule_time '{}', falling back to 03:00",
                self.prune_schedule_time
            );
            NaiveTime::from_hms_opt(3, 0, 0).unwrap_or_default()
        })
    }
}

/// 空字符串视为未配置
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://lead_insights.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_forms_prefix() -> String {
    "/forms".to_string()
}

fn default_attribution_key() -> String {
    "__attribution".to_string()
}

fn default_cookie_name() -> String {
    "lead_insights_attribution".to_string()
}

fn default_cookie_ttl_days() -> i64 {
    30
}

fn default_top_n() -> i64 {
    10
}

fn default_date_range_days() -> i64 {
    30
}

fn default_retention_days() -> i64 {
    365
}

fn default_prune_schedule_time() -> String {
    "03:00".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            admin_prefix: default_admin_prefix(),
            forms_prefix: default_forms_prefix(),
        }
    }
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attribution_key: default_attribution_key(),
            cookie_name: default_cookie_name(),
            cookie_ttl_days: default_cookie_ttl_days(),
            consent_required: true,
            consent_cookie_name: None,
            consent_cookie_value: None,
            store_landing_without_consent: true,
            store_referrer_without_consent: false,
            top_n: default_top_n(),
            default_date_range_days: default_date_range_days(),
            retention_days: default_retention_days(),
            prune_schedule_enabled: false,
            prune_schedule: PruneSchedule::default(),
            prune_schedule_time: default_prune_schedule_time(),
        }
    }
}
