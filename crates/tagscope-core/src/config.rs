//! Configuration loading and parsing for tagscope
//!
//! A `tagscope.toml` file registers tags: the handler kind each one resolves to
//! and the scripting variables it declares.
//!
//! ```toml
//! [[tag]]
//! name = "forEach"
//! kind = "iterating"
//!
//! [[tag.variable]]
//! name_from_attribute = "var"
//! type = "java.lang.Object"
//! scope = "NESTED"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::handler::HandlerKind;
use crate::variable::VariableScope;

pub const CONFIG_FILENAME: &str = "tagscope.toml";

pub const DEFAULT_VARIABLE_TYPE: &str = "java.lang.String";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["tag"];
const KNOWN_TAG_KEYS: &[&str] = &["name", "kind", "variable"];
const KNOWN_VARIABLE_KEYS: &[&str] = &["name", "name_from_attribute", "type", "declare", "scope"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Invalid tag registration in '{path}': {message}")]
    InvalidTag { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "tag")]
    pub tags: Vec<TagConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TagConfig {
    pub name: String,
    pub kind: HandlerKind,
    #[serde(default, rename = "variable")]
    pub variables: Vec<VariableConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VariableConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_from_attribute: Option<String>,
    #[serde(default = "default_type", rename = "type")]
    pub type_name: String,
    #[serde(default = "default_declare")]
    pub declare: bool,
    #[serde(default = "default_scope")]
    pub scope: VariableScope,
}

fn default_type() -> String {
    DEFAULT_VARIABLE_TYPE.to_string()
}

fn default_declare() -> bool {
    true
}

fn default_scope() -> VariableScope {
    VariableScope::Nested
}

/// Where a variable's name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource<'a> {
    Given(&'a str),
    /// The value of this attribute on the invocation.
    FromAttribute(&'a str),
}

impl VariableConfig {
    pub fn name_source(&self) -> Option<NameSource<'_>> {
        match (&self.name, &self.name_from_attribute) {
            (Some(name), None) => Some(NameSource::Given(name)),
            (None, Some(attribute)) => Some(NameSource::FromAttribute(attribute)),
            _ => None,
        }
    }
}

impl Config {
    pub fn tag(&self, name: &str) -> Option<&TagConfig> {
        self.tags.iter().find(|tag| tag.name == name)
    }

    fn validate(&self) -> Result<(), String> {
        let mut names = HashSet::new();
        for tag in &self.tags {
            if tag.name.trim().is_empty() {
                return Err("tag name is empty".to_string());
            }
            if !names.insert(tag.name.as_str()) {
                return Err(format!("tag '{}' is registered twice", tag.name));
            }
            for (index, var) in tag.variables.iter().enumerate() {
                if var.name_source().is_none() {
                    return Err(format!(
                        "variable #{} of tag '{}' needs exactly one of 'name' and 'name_from_attribute'",
                        index + 1,
                        tag.name
                    ));
                }
            }
        }
        Ok(())
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(path, &content)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = parse_config(path, &content)?;
    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn parse_config(path: &Path, content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    config.validate().map_err(|message| ConfigError::InvalidTag {
        path: path.to_path_buf(),
        message,
    })?;

    Ok(config)
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    let Some(toml::Value::Array(tags)) = table.get("tag") else {
        return warnings;
    };

    let known_tag: HashSet<&str> = KNOWN_TAG_KEYS.iter().copied().collect();
    let known_variable: HashSet<&str> = KNOWN_VARIABLE_KEYS.iter().copied().collect();
    for tag in tags.iter().filter_map(toml::Value::as_table) {
        let tag_name = tag.get("name").and_then(toml::Value::as_str).unwrap_or("?");

        for key in tag.keys() {
            if !known_tag.contains(key.as_str()) {
                warnings.push(format!(
                    "Unknown config option in [[tag]] '{}': '{}'",
                    tag_name, key
                ));
            }
        }

        if let Some(toml::Value::Array(variables)) = tag.get("variable") {
            for variable in variables.iter().filter_map(toml::Value::as_table) {
                for key in variable.keys() {
                    if !known_variable.contains(key.as_str()) {
                        warnings.push(format!(
                            "Unknown config option in [[tag.variable]] of '{}': '{}'",
                            tag_name, key
                        ));
                    }
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn load_config_from_file() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
[[tag]]
name = "forEach"
kind = "iterating"

[[tag.variable]]
name_from_attribute = "var"
type = "java.lang.Object"
scope = "NESTED"

[[tag.variable]]
name = "status"
type = "LoopStatus"
declare = false
scope = "AT_BEGIN"
"#,
        );

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.tags.len(), 1);
        let tag = config.tag("forEach").unwrap();
        assert_eq!(tag.kind, HandlerKind::Iterating);
        assert_eq!(tag.variables.len(), 2);
        assert_eq!(
            tag.variables[0].name_source(),
            Some(NameSource::FromAttribute("var"))
        );
        assert_eq!(tag.variables[1].name_source(), Some(NameSource::Given("status")));
        assert!(!tag.variables[1].declare);
        assert_eq!(tag.variables[1].scope, VariableScope::AtBegin);
    }

    #[test]
    fn variable_defaults_follow_protocol() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
[[tag]]
name = "out"
kind = "classic"

[[tag.variable]]
name = "value"
"#,
        );

        let config = load_config(&config_path).unwrap();
        let var = &config.tags[0].variables[0];

        assert_eq!(var.type_name, DEFAULT_VARIABLE_TYPE);
        assert!(var.declare);
        assert_eq!(var.scope, VariableScope::Nested);
    }

    #[test]
    fn kind_and_scope_accept_alternate_spellings() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
[[tag]]
name = "buffer"
kind = "body_buffering"

[[tag.variable]]
name = "text"
scope = "at-end"
"#,
        );

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.tags[0].kind, HandlerKind::BodyBuffering);
        assert_eq!(config.tags[0].variables[0].scope, VariableScope::AtEnd);
    }

    #[test]
    fn empty_config_file_uses_defaults() {
        let dir = create_temp_dir();
        let config_path = write_config(&dir, "");

        let config = load_config(&config_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn error_on_invalid_toml() {
        let dir = create_temp_dir();
        let config_path = write_config(&dir, "this is not valid { toml }");

        let err = load_config(&config_path).unwrap_err();

        match err {
            ConfigError::ParseError { path, message } => {
                assert_eq!(path, config_path);
                assert!(!message.is_empty());
            }
            _ => panic!("Expected ParseError"),
        }
    }

    #[test]
    fn error_on_unknown_kind() {
        let dir = create_temp_dir();
        let config_path = write_config(&dir, "[[tag]]\nname = \"x\"\nkind = \"tag-file\"\n");

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn error_on_missing_file() {
        let dir = create_temp_dir();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            load_config(&missing),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn error_when_variable_has_both_name_sources() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
[[tag]]
name = "t"
kind = "simple"

[[tag.variable]]
name = "a"
name_from_attribute = "var"
"#,
        );

        let err = load_config(&config_path).unwrap_err();

        match err {
            ConfigError::InvalidTag { message, .. } => {
                assert!(message.contains("variable #1"));
                assert!(message.contains("'t'"));
            }
            _ => panic!("Expected InvalidTag"),
        }
    }

    #[test]
    fn error_when_variable_has_no_name_source() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            "[[tag]]\nname = \"t\"\nkind = \"simple\"\n\n[[tag.variable]]\nscope = \"AT_END\"\n",
        );

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidTag { .. })
        ));
    }

    #[test]
    fn error_on_duplicate_tag() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            "[[tag]]\nname = \"t\"\nkind = \"simple\"\n\n[[tag]]\nname = \"t\"\nkind = \"classic\"\n",
        );

        let err = load_config(&config_path).unwrap_err();
        assert!(err.to_string().contains("registered twice"));
    }

    #[test]
    fn find_config_file_in_parent_directory() {
        let parent = create_temp_dir();
        let child = parent.path().join("subdir");
        fs::create_dir(&child).unwrap();
        let config_path = write_config(&parent, "");

        let found = find_config_file(&child);

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn find_config_file_returns_none_when_not_found() {
        let dir = create_temp_dir();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn warns_on_unknown_keys_at_every_level() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
typo = true

[[tag]]
name = "forEach"
kind = "iterating"
body = "scriptless"

[[tag.variable]]
name = "item"
visibility = "NESTED"
"#,
        );

        let result = load_config_with_warnings(&config_path).unwrap();

        assert_eq!(result.config.tags.len(), 1);
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings[0].contains("typo"));
        assert!(result.warnings[1].contains("body"));
        assert!(result.warnings[1].contains("forEach"));
        assert!(result.warnings[2].contains("visibility"));
    }

    #[test]
    fn no_warnings_for_valid_config() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            r#"
[[tag]]
name = "set"
kind = "simple"

[[tag.variable]]
name = "result"
type = "Integer"
declare = true
scope = "AT_END"
"#,
        );

        let result = load_config_with_warnings(&config_path).unwrap();

        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_with_warnings_surfaces_invalid_registration() {
        let dir = create_temp_dir();
        let config_path = write_config(
            &dir,
            "extra = 1\n\n[[tag]]\nname = \"t\"\nkind = \"simple\"\n\n[[tag]]\nname = \"t\"\nkind = \"simple\"\n",
        );

        assert!(matches!(
            load_config_with_warnings(&config_path),
            Err(ConfigError::InvalidTag { .. })
        ));
    }

    #[test]
    fn config_error_display_is_helpful() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("/path/to/tagscope.toml"),
            message: "expected `=`".to_string(),
        };

        let msg = format!("{}", err);

        assert!(msg.contains("/path/to/tagscope.toml"));
        assert!(msg.contains("expected `=`"));
    }
}
