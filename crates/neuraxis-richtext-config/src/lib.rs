use log::debug;
use neuraxis_richtext_engine::formatting::Hotkeys;
use neuraxis_richtext_engine::mentions::{
    DEFAULT_LIMIT, MentionEngine, StaticCandidates, USERNAMES,
};
use neuraxis_richtext_engine::models::{ElementType, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read usernames file at {path}: {source}")]
    UsernamesReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Editor settings, read from `~/.config/neuraxis-richtext/config.toml`.
///
/// Every section is optional. A `[hotkeys]` table replaces the default
/// bindings rather than adding to them.
///
/// ```toml
/// [mentions]
/// usernames_file = "~/team.txt"
/// limit = 5
///
/// [hotkeys]
/// "mod+b" = "bold"
/// "mod+u" = "underline"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mentions: MentionsConfig,
    pub hotkeys: Hotkeys,
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionsConfig {
    pub usernames: Vec<String>,
    /// One username per line; `#` starts a comment. Takes precedence over
    /// `usernames` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usernames_file: Option<PathBuf>,
    pub limit: usize,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            usernames: USERNAMES.iter().map(|name| name.to_string()).collect(),
            usernames_file: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub inline: Vec<ElementType>,
    pub void: Vec<ElementType>,
    pub markable_void: Vec<ElementType>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        let schema = Schema::default();
        Self {
            inline: schema.inline.into_iter().collect(),
            void: schema.void.into_iter().collect(),
            markable_void: schema.markable_void.into_iter().collect(),
        }
    }
}

impl From<&SchemaConfig> for Schema {
    fn from(config: &SchemaConfig) -> Self {
        let set = |kinds: &[ElementType]| kinds.iter().copied().collect::<BTreeSet<_>>();
        Schema {
            inline: set(&config.inline),
            void: set(&config.void),
            markable_void: set(&config.markable_void),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the usernames file path
        config.mentions.usernames_file = config
            .mentions
            .usernames_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/neuraxis-richtext");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn schema(&self) -> Schema {
        Schema::from(&self.schema)
    }

    /// The usernames offered for mentions, from the file when one is set.
    pub fn candidates(&self) -> Result<StaticCandidates, ConfigError> {
        let Some(path) = &self.mentions.usernames_file else {
            return Ok(StaticCandidates::new(self.mentions.usernames.clone()));
        };
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::UsernamesReadError {
                path: path.clone(),
                source,
            })?;
        let names: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        debug!("{} usernames from {}", names.len(), path.display());
        Ok(StaticCandidates::new(names))
    }

    pub fn mention_engine(&self) -> Result<MentionEngine, ConfigError> {
        Ok(MentionEngine::new(self.candidates()?).with_limit(self.mentions.limit))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuraxis_richtext_engine::mentions::CandidateSource;
    use neuraxis_richtext_engine::models::{Element, Mark, Point, Range, Value};
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/neuraxis-richtext/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.mentions.limit, 10);
        assert_eq!(config.hotkeys.mark_for("mod+i"), Some(Mark::Italic));
        assert_eq!(config.schema(), Schema::default());
    }

    #[test]
    fn test_hotkeys_table_replaces_defaults() {
        let config: Config = toml::from_str(
            r#"
[hotkeys]
"mod+u" = "underline"
"#,
        )
        .unwrap();

        assert_eq!(config.hotkeys.mark_for("mod+u"), Some(Mark::Underline));
        assert_eq!(config.hotkeys.mark_for("mod+b"), None);
    }

    #[test]
    fn test_schema_section() {
        let config: Config = toml::from_str(
            r#"
[schema]
inline = ["mention"]
void = []
markable_void = []
"#,
        )
        .unwrap();

        let schema = config.schema();
        assert!(schema.inline.contains(&ElementType::Mention));
        assert!(schema.void.is_empty());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_usernames_file_with_env_var() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("team.txt"),
            "# the team\nzoe\n\n  zack  \nada\n",
        )
        .unwrap();
        unsafe {
            env::set_var("NEURAXIS_TEAM_DIR", temp_dir.path());
        }

        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            r#"
[mentions]
usernames_file = "$NEURAXIS_TEAM_DIR/team.txt"
limit = 1
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(
            config.mentions.usernames_file,
            Some(temp_dir.path().join("team.txt"))
        );
        let candidates = config.candidates().unwrap();
        assert_eq!(candidates.names(), ["zoe", "zack", "ada"]);
        assert_eq!(candidates.lookup("z"), vec!["zoe", "zack"]);

        unsafe {
            env::remove_var("NEURAXIS_TEAM_DIR");
        }
    }

    #[test]
    fn test_missing_usernames_file() {
        let config = Config {
            mentions: MentionsConfig {
                usernames_file: Some(PathBuf::from("/nonexistent/team.txt")),
                ..MentionsConfig::default()
            },
            ..Config::default()
        };

        assert!(matches!(
            config.candidates(),
            Err(ConfigError::UsernamesReadError { .. })
        ));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_rejects_unknown_mark() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[hotkeys]\n\"mod+s\" = \"strike\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut test_config = Config::default();
        test_config.mentions.usernames = vec!["ben".into(), "erinn".into()];
        test_config.mentions.limit = 3;

        // Test saving
        test_config.save_to_path(&config_file).unwrap();

        // Test loading
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_mention_engine_uses_limit() {
        let mut config = Config::default();
        config.mentions.limit = 2;
        let mut engine = config.mention_engine().unwrap();

        let value = Value::new(vec![Element::paragraph("@m").into()])
            .with_selection(Range::collapsed(Point::new([0, 0], 2)));
        engine.evaluate(&value, &config.schema(), 1);

        assert_eq!(engine.state().candidates, ["margie", "mark"]);
    }
}
