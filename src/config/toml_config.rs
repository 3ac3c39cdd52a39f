use super::ServerConfig;
use crate::utils::error::{CheckinError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk configuration. Every section and key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub exports: ExportsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportsSection {
    pub downloads_dir: Option<String>,
    pub document_title: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| CheckinError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CheckinError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DOWNLOADS_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CheckinError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_to(self, config: &mut ServerConfig) {
        if let Some(host) = self.server.host {
            config.host = host;
        }
        if let Some(port) = self.server.port {
            config.port = port;
        }
        if let Some(limit) = self.server.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(dir) = self.exports.downloads_dir {
            config.downloads_dir = Some(dir);
        }
        if let Some(title) = self.exports.document_title {
            config.document_title = title;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
max_upload_bytes = 2048

[exports]
downloads_dir = "./downloads"
document_title = "Volunteers"
"#;

        let mut config = ServerConfig::default();
        TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .apply_to(&mut config);

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.downloads_dir.as_deref(), Some("./downloads"));
        assert_eq!(config.document_title, "Volunteers");
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let mut config = ServerConfig::default();
        TomlConfig::from_toml_str("").unwrap().apply_to(&mut config);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("EVENT_CHECKIN_TEST_DOWNLOADS", "/srv/exports");

        let config = TomlConfig::from_toml_str(
            r#"
[exports]
downloads_dir = "${EVENT_CHECKIN_TEST_DOWNLOADS}"
document_title = "${EVENT_CHECKIN_TEST_UNSET_TITLE}"
"#,
        )
        .unwrap();

        assert_eq!(config.exports.downloads_dir.as_deref(), Some("/srv/exports"));
        assert_eq!(
            config.exports.document_title.as_deref(),
            Some("${EVENT_CHECKIN_TEST_UNSET_TITLE}")
        );

        std::env::remove_var("EVENT_CHECKIN_TEST_DOWNLOADS");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = TomlConfig::from_toml_str("[server]\nprot = 80\n").unwrap_err();
        assert!(matches!(err, CheckinError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 6000\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, Some(6000));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            TomlConfig::from_file("/nonexistent/checkin.toml"),
            Err(CheckinError::ConfigError { .. })
        ));
    }
}
