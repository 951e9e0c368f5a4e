use fully_pub::fully_pub;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;

use crate::errors::KindctlError;

//
// ==== Structs for kindctl.yaml parsing ====
//

/// Desired state of the local cluster and its addons.
///
/// Absent addon keys deserialize as that addon's defaults with
/// `enabled: false`; only [`ClusterConfig::default`] turns the dashboard on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[fully_pub]
struct ClusterConfig {
    #[serde(default)]
    logging: Logging,
    #[serde(default)]
    cluster: ClusterSpec,

    #[serde(default)]
    postgres: PostgresSpec,
    #[serde(default)]
    redis: RedisSpec,
    #[serde(default)]
    pgadmin: PgAdminSpec,
    #[serde(default)]
    adminer: AdminerSpec,
    #[serde(default)]
    rabbitmq: RabbitMqSpec,
    #[serde(default)]
    mailpit: MailpitSpec,
    #[serde(default)]
    dashboard: DashboardSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct Logging {
    level: LogLevel,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct ClusterSpec {
    name: String,
    // coerced to at least one worker when the topology is generated
    #[serde(rename = "workerNodes")]
    worker_nodes: u32,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        ClusterSpec {
            name: "kind-cluster".to_string(),
            worker_nodes: 1,
        }
    }
}

impl ClusterSpec {
    /// kubeconfig context that kind registers for this cluster.
    pub fn kube_context(&self) -> String {
        format!("kind-{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct PostgresSpec {
    enabled: bool,
    ingress: String,
    version: String,
    username: String,
    password: String,
    database: String,
    namespace: String,
}

impl Default for PostgresSpec {
    fn default() -> Self {
        PostgresSpec {
            enabled: false,
            ingress: "postgres.local".to_string(),
            version: "16".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct RedisSpec {
    enabled: bool,
    ingress: String,
    namespace: String,
}

impl Default for RedisSpec {
    fn default() -> Self {
        RedisSpec {
            enabled: false,
            ingress: "redis.local".to_string(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct PgAdminSpec {
    enabled: bool,
    ingress: String,
    email: String,
    password: String,
    namespace: String,
}

impl Default for PgAdminSpec {
    fn default() -> Self {
        PgAdminSpec {
            enabled: false,
            ingress: "pgadmin.local".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin".to_string(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct AdminerSpec {
    enabled: bool,
    ingress: String,
    namespace: String,
}

impl Default for AdminerSpec {
    fn default() -> Self {
        AdminerSpec {
            enabled: false,
            ingress: "adminer.local".to_string(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct RabbitMqSpec {
    enabled: bool,
    ingress: String,
    username: String,
    password: String,
    namespace: String,
}

impl Default for RabbitMqSpec {
    fn default() -> Self {
        RabbitMqSpec {
            enabled: false,
            ingress: "rabbitmq.local".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct MailpitSpec {
    enabled: bool,
    ingress: String,
    // web UI basic auth, only applied when both are set
    username: String,
    password: String,
    namespace: String,
}

impl Default for MailpitSpec {
    fn default() -> Self {
        MailpitSpec {
            enabled: false,
            ingress: "mailpit.local".to_string(),
            username: String::new(),
            password: String::new(),
            namespace: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[fully_pub]
struct DashboardSpec {
    enabled: bool,
    ingress: String,
    version: String,
}

impl Default for DashboardSpec {
    fn default() -> Self {
        DashboardSpec {
            enabled: false,
            ingress: "dashboard.local".to_string(),
            version: "v2.7.0".to_string(),
        }
    }
}

/// Configuration written by `init` when no document exists yet.
impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            logging: Logging::default(),
            cluster: ClusterSpec::default(),
            postgres: PostgresSpec::default(),
            redis: RedisSpec::default(),
            pgadmin: PgAdminSpec::default(),
            adminer: AdminerSpec::default(),
            rabbitmq: RabbitMqSpec::default(),
            mailpit: MailpitSpec::default(),
            dashboard: DashboardSpec {
                enabled: true,
                ..Default::default()
            },
        }
    }
}

//
// ==== Addon bookkeeping ====
//

/// Every addon this tool knows how to install, in installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddonKind {
    Dashboard,
    Postgres,
    Redis,
    PgAdmin,
    Adminer,
    RabbitMq,
    Mailpit,
}

impl AddonKind {
    pub const ALL: [AddonKind; 7] = [
        AddonKind::Dashboard,
        AddonKind::Postgres,
        AddonKind::Redis,
        AddonKind::PgAdmin,
        AddonKind::Adminer,
        AddonKind::RabbitMq,
        AddonKind::Mailpit,
    ];

    /// Top-level key in the configuration document.
    pub fn key(self) -> &'static str {
        match self {
            AddonKind::Dashboard => "dashboard",
            AddonKind::Postgres => "postgres",
            AddonKind::Redis => "redis",
            AddonKind::PgAdmin => "pgadmin",
            AddonKind::Adminer => "adminer",
            AddonKind::RabbitMq => "rabbitmq",
            AddonKind::Mailpit => "mailpit",
        }
    }
}

impl std::fmt::Display for AddonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl ClusterConfig {
    pub fn is_enabled(&self, kind: AddonKind) -> bool {
        match kind {
            AddonKind::Dashboard => self.dashboard.enabled,
            AddonKind::Postgres => self.postgres.enabled,
            AddonKind::Redis => self.redis.enabled,
            AddonKind::PgAdmin => self.pgadmin.enabled,
            AddonKind::Adminer => self.adminer.enabled,
            AddonKind::RabbitMq => self.rabbitmq.enabled,
            AddonKind::Mailpit => self.mailpit.enabled,
        }
    }

    pub fn ingress(&self, kind: AddonKind) -> &str {
        match kind {
            AddonKind::Dashboard => &self.dashboard.ingress,
            AddonKind::Postgres => &self.postgres.ingress,
            AddonKind::Redis => &self.redis.ingress,
            AddonKind::PgAdmin => &self.pgadmin.ingress,
            AddonKind::Adminer => &self.adminer.ingress,
            AddonKind::RabbitMq => &self.rabbitmq.ingress,
            AddonKind::Mailpit => &self.mailpit.ingress,
        }
    }

    /// Enabled addons in installation order.
    pub fn enabled_addons(&self) -> Vec<AddonKind> {
        AddonKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), KindctlError> {
        let name = self.cluster.name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(KindctlError::InvalidConfig(format!(
                "cluster.name {:?} must be a non-empty name without whitespace",
                self.cluster.name
            )));
        }

        for kind in self.enabled_addons() {
            let host = self.ingress(kind);
            if !super::is_valid_hostname(host) {
                return Err(KindctlError::InvalidConfig(format!(
                    "{kind}.ingress {host:?} is not a valid hostname"
                )));
            }
        }

        Ok(())
    }

    /// Hostnames claimed by more than one enabled addon.
    pub fn duplicate_ingresses(&self) -> Vec<(String, Vec<AddonKind>)> {
        self.enabled_addons()
            .into_iter()
            .map(|kind| (self.ingress(kind).to_string(), kind))
            .into_group_map()
            .into_iter()
            .filter(|(_, kinds)| kinds.len() > 1)
            .sorted()
            .collect()
    }
}

/// The subset of [`ClusterConfig`] that gets written back to disk: logging,
/// cluster and only the addons that are enabled.
#[derive(Debug, Serialize)]
pub(super) struct PersistedConfig<'a> {
    logging: &'a Logging,
    cluster: &'a ClusterSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    postgres: Option<&'a PostgresSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redis: Option<&'a RedisSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pgadmin: Option<&'a PgAdminSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adminer: Option<&'a AdminerSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rabbitmq: Option<&'a RabbitMqSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mailpit: Option<&'a MailpitSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dashboard: Option<&'a DashboardSpec>,
}

impl<'a> From<&'a ClusterConfig> for PersistedConfig<'a> {
    fn from(c: &'a ClusterConfig) -> Self {
        PersistedConfig {
            logging: &c.logging,
            cluster: &c.cluster,
            postgres: c.postgres.enabled.then_some(&c.postgres),
            redis: c.redis.enabled.then_some(&c.redis),
            pgadmin: c.pgadmin.enabled.then_some(&c.pgadmin),
            adminer: c.adminer.enabled.then_some(&c.adminer),
            rabbitmq: c.rabbitmq.enabled.then_some(&c.rabbitmq),
            mailpit: c.mailpit.enabled.then_some(&c.mailpit),
            dashboard: c.dashboard.enabled.then_some(&c.dashboard),
        }
    }
}
