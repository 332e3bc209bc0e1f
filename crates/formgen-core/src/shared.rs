//! Shared types used across the formgen crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// How long an error or success notice stays visible unless dismissed first.
pub const DEFAULT_NOTICE_TTL_SECS: u64 = 6;

/// Form categories offered at the client surface. The chosen label is sent
/// verbatim as the generation request's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    School,
    Office,
    Freelance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::School, Category::Office, Category::Freelance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::School => "School",
            Category::Office => "Office",
            Category::Freelance => "Freelance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Client configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Title shown in the client chrome.
    pub app_name: String,
    /// Origin of the generation service (e.g. `http://localhost:8080`).
    pub base_url: String,
    /// Per-request timeout for the generation and probe calls.
    pub request_timeout_secs: u64,
    /// Lifetime of an undismissed notice.
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_secs: u64,
    /// File the terminal client writes its log to (stdout belongs to the UI).
    pub log_path: String,
}

fn default_notice_ttl() -> u64 {
    DEFAULT_NOTICE_TTL_SECS
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    /// Load config from file and environment. Precedence: env `FORMGEN__*` > file at
    /// `FORMGEN_CONFIG` (default `config/formgen`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("FORMGEN_CONFIG").unwrap_or_else(|_| "config/formgen".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`ClientConfig::load`] with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("app_name", "Form Generator")?
            .set_default("base_url", "http://localhost:8080")?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("notice_ttl_secs", DEFAULT_NOTICE_TTL_SECS as i64)?
            .set_default("log_path", "formgen-tui.log")?;

        let with_ext = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_ext.is_file() {
            builder.add_source(config::File::from(with_ext.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("FORMGEN").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_name: "Form Generator".to_string(),
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            notice_ttl_secs: DEFAULT_NOTICE_TTL_SECS,
            log_path: "formgen-tui.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("absent")).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.notice_ttl(), Duration::from_secs(6));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formgen.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "base_url = \"http://forms.internal:9000\"").unwrap();
        writeln!(file, "notice_ttl_secs = 2").unwrap();
        drop(file);

        let config = ClientConfig::load_from(&dir.path().join("formgen")).unwrap();
        assert_eq!(config.base_url, "http://forms.internal:9000");
        assert_eq!(config.notice_ttl_secs, 2);
        assert_eq!(config.app_name, "Form Generator");
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formgen.toml");
        std::fs::write(&path, "log_path = \"from-file.log\"\nrequest_timeout_secs = 5\n").unwrap();

        // Only this test touches FORMGEN__LOG_PATH.
        std::env::set_var("FORMGEN__LOG_PATH", "from-env.log");
        let loaded = ClientConfig::load_from(&path);
        std::env::remove_var("FORMGEN__LOG_PATH");

        let config = loaded.unwrap();
        assert_eq!(config.log_path, "from-env.log");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn category_labels_are_sent_verbatim() {
        let labels: Vec<String> = Category::ALL.iter().map(|c| String::from(*c)).collect();
        assert_eq!(labels, vec!["School", "Office", "Freelance"]);
    }
}
