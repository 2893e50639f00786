use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::presets;

/// On-disk configuration. The core only reads `command`, `editor`, and the
/// optional pre-seeded repository list; every key may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Free-form command template, e.g. `code --goto '{pathLineColumn}'`.
    /// Takes precedence over `editor` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Default preset name, possibly with a sub-argument (`vim:myserver`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    /// Cached repository roots; when present, startup skips the initial scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<PathBuf>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            editor: Some("system".to_string()),
            repositories: None,
        }
    }
}

impl Config {
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("codelink"))
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Write the config back with a generated header documenting the template
    /// placeholders and the presets registered on this platform.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let content = format!("{}{body}", doc_header());
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Get a config value by key
    pub fn get_value(&self, key: &str) -> Result<String> {
        match key {
            "command" => Ok(self.command.clone().unwrap_or_default()),
            "editor" => Ok(self.editor.clone().unwrap_or_default()),
            _ => anyhow::bail!("Unknown config key: {key}"),
        }
    }

    /// Set a config value by key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        match key {
            "command" => self.command = value,
            "editor" => self.editor = value,
            _ => anyhow::bail!("Unknown config key: {key}"),
        }
        Ok(())
    }
}

fn doc_header() -> String {
    format!(
        "# Choose an editor preset with `editor`, or set a custom `command` template.\n\
         # Template placeholders: {{path}} {{pathLine}} {{pathLineColumn}} {{root}}\n\
         # {{relPath}} {{line}} {{column}} {{editor}}. The path and numbers render\n\
         # as path:12:34.\n\
         # Available presets: {}\n\n",
        presets::available().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_editor_is_system() {
        let config = Config::default();
        assert_eq!(config.editor.as_deref(), Some("system"));
        assert!(config.command.is_none());
        assert!(config.repositories.is_none());
    }

    #[test]
    fn test_parse_tolerates_missing_keys() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.editor.as_deref(), Some("system"));

        let config: Config = toml::from_str("editor = \"vim:work\"\n").unwrap();
        assert_eq!(config.editor.as_deref(), Some("vim:work"));
    }

    #[test]
    fn test_parse_repositories() {
        let config: Config =
            toml::from_str("repositories = [\"/home/u/proj\"]\n").unwrap();
        assert_eq!(
            config.repositories,
            Some(vec![PathBuf::from("/home/u/proj")])
        );
    }

    #[test]
    fn test_serialized_config_round_trips() {
        let config = Config {
            command: Some("edit {path}".to_string()),
            editor: Some("vim".to_string()),
            repositories: Some(vec![PathBuf::from("/a")]),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.command, config.command);
        assert_eq!(parsed.editor, config.editor);
        assert_eq!(parsed.repositories, config.repositories);
    }

    #[test]
    fn test_get_set_value() {
        let mut config = Config::default();
        config.set_value("command", "edit {path}").unwrap();
        assert_eq!(config.get_value("command").unwrap(), "edit {path}");
        config.set_value("editor", "").unwrap();
        assert_eq!(config.get_value("editor").unwrap(), "");
        assert!(config.set_value("bogus", "x").is_err());
    }

    #[test]
    fn test_doc_header_lists_presets() {
        let header = doc_header();
        assert!(header.contains("system"));
        assert!(header.lines().all(|l| l.is_empty() || l.starts_with('#')));
    }
}
