use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use assurconnect_core::LeadCategory;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "assurconnect";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_DISPATCH_TIMEOUT_SECONDS: u64 = 10;
pub const MAX_DISPATCH_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_USER_AGENT: &str = "assurconnect";
pub const DEFAULT_EMAIL_SUBJECT_PREFIX: &str = "assurconnect";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dispatch: DispatchConfig,
    /// Webhook per category. Categories without an entry are not forwarded.
    pub endpoints: BTreeMap<LeadCategory, Url>,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub enabled: bool,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub backend: NotificationBackend,
    pub email: Option<NotificationsEmailConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    Stdout,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationsEmailConfig {
    pub from: String,
    pub to: Vec<String>,
    pub subject_prefix: String,
    pub smtp_host: String,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password_env: Option<String>,
    pub tls: EmailTls,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailTls {
    None,
    StartTls,
    Tls,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig {
                enabled: true,
                timeout_seconds: DEFAULT_DISPATCH_TIMEOUT_SECONDS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            endpoints: BTreeMap::new(),
            notifications: NotificationsConfig {
                enabled: false,
                backend: NotificationBackend::Stdout,
                email: None,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid endpoint for {category}: {url}")]
    InvalidEndpoint { category: LeadCategory, url: String },
    #[error("invalid dispatch.timeout_seconds value: {0}")]
    InvalidDispatchTimeout(u64),
    #[error("invalid dispatch.user_agent value")]
    InvalidUserAgent,
    #[error("notifications.backend = \"email\" requires a [notifications.email] section")]
    MissingNotificationsEmail,
    #[error("invalid notifications.email.{field}: {message}")]
    InvalidNotificationsEmailField {
        field: &'static str,
        message: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    dispatch: Option<DispatchFile>,
    endpoints: Option<EndpointsFile>,
    notifications: Option<NotificationsFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DispatchFile {
    enabled: Option<bool>,
    timeout_seconds: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EndpointsFile {
    auto: Option<String>,
    #[serde(alias = "habitation")]
    home: Option<String>,
    #[serde(alias = "sante")]
    health: Option<String>,
    #[serde(alias = "animaux")]
    pet: Option<String>,
    #[serde(rename = "professional-liability", alias = "rc-pro")]
    professional_liability: Option<String>,
}

impl EndpointsFile {
    fn into_entries(self) -> Vec<(LeadCategory, String)> {
        [
            (LeadCategory::Auto, self.auto),
            (LeadCategory::Home, self.home),
            (LeadCategory::Health, self.health),
            (LeadCategory::Pet, self.pet),
            (LeadCategory::ProfessionalLiability, self.professional_liability),
        ]
        .into_iter()
        .filter_map(|(category, url)| url.map(|url| (category, url)))
        .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotificationsFile {
    enabled: Option<bool>,
    backend: Option<NotificationBackend>,
    email: Option<NotificationsEmailFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotificationsEmailFile {
    from: String,
    to: Vec<String>,
    subject_prefix: Option<String>,
    smtp_host: String,
    smtp_port: Option<u16>,
    username: Option<String>,
    password_env: Option<String>,
    tls: Option<EmailTls>,
    timeout_seconds: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(dispatch) = parsed.dispatch {
        if let Some(enabled) = dispatch.enabled {
            config.dispatch.enabled = enabled;
        }
        if let Some(timeout) = dispatch.timeout_seconds {
            if timeout == 0 || timeout > MAX_DISPATCH_TIMEOUT_SECONDS {
                return Err(ConfigError::InvalidDispatchTimeout(timeout));
            }
            config.dispatch.timeout_seconds = timeout;
        }
        if let Some(user_agent) = dispatch.user_agent {
            let trimmed = user_agent.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::InvalidUserAgent);
            }
            config.dispatch.user_agent = trimmed.to_string();
        }
    }

    if let Some(endpoints) = parsed.endpoints {
        for (category, raw) in endpoints.into_entries() {
            let url = parse_endpoint(category, &raw)?;
            config.endpoints.insert(category, url);
        }
    }

    if let Some(notifications) = parsed.notifications {
        if let Some(enabled) = notifications.enabled {
            config.notifications.enabled = enabled;
        }
        if let Some(backend) = notifications.backend {
            config.notifications.backend = backend;
        }
        if let Some(email) = notifications.email {
            config.notifications.email = Some(parse_email_config(email)?);
        }
    }

    if config.notifications.enabled
        && config.notifications.backend == NotificationBackend::Email
        && config.notifications.email.is_none()
    {
        return Err(ConfigError::MissingNotificationsEmail);
    }

    Ok(config)
}

fn parse_endpoint(category: LeadCategory, raw: &str) -> Result<Url> {
    let invalid = || ConfigError::InvalidEndpoint {
        category,
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

fn parse_email_config(file: NotificationsEmailFile) -> Result<NotificationsEmailConfig> {
    let from = file.from.trim().to_string();
    if from.parse::<lettre::message::Mailbox>().is_err() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "from",
            message: format!("not a valid mailbox: {from}"),
        });
    }

    if file.to.is_empty() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "to",
            message: "at least one recipient is required".to_string(),
        });
    }
    let mut to = Vec::with_capacity(file.to.len());
    for raw in file.to {
        let trimmed = raw.trim().to_string();
        if trimmed.parse::<lettre::message::Mailbox>().is_err() {
            return Err(ConfigError::InvalidNotificationsEmailField {
                field: "to",
                message: format!("not a valid mailbox: {trimmed}"),
            });
        }
        to.push(trimmed);
    }

    let smtp_host = file.smtp_host.trim().to_string();
    if smtp_host.is_empty() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "smtp_host",
            message: "cannot be empty".to_string(),
        });
    }

    if file.username.is_some() != file.password_env.is_some() {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "username",
            message: "username and password_env must be set together".to_string(),
        });
    }

    if file.timeout_seconds == Some(0) {
        return Err(ConfigError::InvalidNotificationsEmailField {
            field: "timeout_seconds",
            message: "must be greater than zero".to_string(),
        });
    }

    Ok(NotificationsEmailConfig {
        from,
        to,
        subject_prefix: file
            .subject_prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT_PREFIX.to_string()),
        smtp_host,
        smtp_port: file.smtp_port,
        username: file.username,
        password_env: file.password_env,
        tls: file.tls.unwrap_or(EmailTls::StartTls),
        timeout_seconds: file.timeout_seconds,
    })
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, ConfigError, ConfigFile, DispatchFile, EmailTls,
        EndpointsFile, NotificationBackend, NotificationsFile,
    };
    use assurconnect_core::LeadCategory;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn write_config(temp: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        restrict_permissions(&path);
        path
    }

    #[test]
    fn defaults_forward_nothing() {
        let merged = merge_config(ConfigFile::default()).expect("merge");
        assert!(merged.dispatch.enabled);
        assert_eq!(merged.dispatch.timeout_seconds, 10);
        assert!(merged.endpoints.is_empty());
        assert!(!merged.notifications.enabled);
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            dispatch: Some(DispatchFile {
                enabled: Some(false),
                timeout_seconds: Some(3),
                user_agent: Some(" leads-bot ".to_string()),
            }),
            endpoints: Some(EndpointsFile {
                auto: Some("https://hooks.example.com/auto".to_string()),
                ..EndpointsFile::default()
            }),
            notifications: Some(NotificationsFile {
                enabled: Some(true),
                backend: Some(NotificationBackend::Stdout),
                email: None,
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert!(!merged.dispatch.enabled);
        assert_eq!(merged.dispatch.timeout_seconds, 3);
        assert_eq!(merged.dispatch.user_agent, "leads-bot");
        assert_eq!(
            merged
                .endpoints
                .get(&LeadCategory::Auto)
                .map(|url| url.as_str()),
            Some("https://hooks.example.com/auto")
        );
        assert!(!merged.endpoints.contains_key(&LeadCategory::Home));
        assert!(merged.notifications.enabled);
    }

    #[test]
    fn endpoints_must_be_http() {
        let parsed = ConfigFile {
            endpoints: Some(EndpointsFile {
                pet: Some("ftp://hooks.example.com/pet".to_string()),
                ..EndpointsFile::default()
            }),
            ..ConfigFile::default()
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEndpoint {
                category: LeadCategory::Pet,
                ..
            }
        ));
    }

    #[test]
    fn dispatch_timeout_is_bounded() {
        let parsed = ConfigFile {
            dispatch: Some(DispatchFile {
                timeout_seconds: Some(0),
                ..DispatchFile::default()
            }),
            ..ConfigFile::default()
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidDispatchTimeout(0))
        ));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml_with_legacy_category_key() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            "[dispatch]\ntimeout_seconds = 5\n\n[endpoints]\nhome = \"https://hooks.example.com/home\"\nrc-pro = \"https://hooks.example.com/pro\"\n",
        );

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.dispatch.timeout_seconds, 5);
        assert_eq!(config.endpoints.len(), 2);
        assert!(config
            .endpoints
            .contains_key(&LeadCategory::ProfessionalLiability));
    }

    #[test]
    fn load_at_path_rejects_unknown_category() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            "[endpoints]\nboat = \"https://hooks.example.com/boat\"\n",
        );
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_at_path_parses_email_notifications() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            "[notifications]\nenabled = true\nbackend = \"email\"\n\n[notifications.email]\nfrom = \"AssurConnect <leads@example.com>\"\nto = [\"broker@example.com\"]\nsmtp_host = \"smtp.example.com\"\ntls = \"tls\"\n",
        );
        let config = load_at_path(&path, true).expect("load").expect("config");
        let email = config.notifications.email.expect("email config");
        assert_eq!(email.tls, EmailTls::Tls);
        assert_eq!(email.subject_prefix, "assurconnect");
        assert_eq!(email.to, vec!["broker@example.com".to_string()]);
    }

    #[test]
    fn email_backend_without_section_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            "[notifications]\nenabled = true\nbackend = \"email\"\n",
        );
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::MissingNotificationsEmail));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
