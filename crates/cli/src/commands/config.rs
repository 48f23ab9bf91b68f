use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use stockroom_core::config::{read_env, resolve_config_path};

use crate::commands::{load_config, CommandResult};

/// Effective configuration, one preamble line and one `data` entry per setting.
pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let settings = [
        (
            "store.path",
            config.store.path.display().to_string(),
            source("store.path", &["STOCKROOM_STORE_PATH"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["STOCKROOM_LOGGING_LEVEL", "STOCKROOM_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source("logging.format", &["STOCKROOM_LOGGING_FORMAT", "STOCKROOM_LOG_FORMAT"]),
        ),
    ];

    let lines =
        settings.iter().map(|(key, value, source)| render_line(key, value, source)).collect();
    let data = settings
        .iter()
        .map(|(key, value, source)| json!({ "key": key, "value": value, "source": source }))
        .collect();

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        Some(Value::Array(data)),
    )
    .with_preamble(lines)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<toml::Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<toml::Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&toml::Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &toml::Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, field_source, render_line};

    #[test]
    fn nested_keys_are_found_in_config_document() {
        let doc: Value = "[store]\npath = \"a.json\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "store.path"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn file_source_is_attributed_when_no_env_key_is_set() {
        let doc: Value = "[logging]\nlevel = \"warn\"\n".parse().expect("toml");
        let source = field_source(
            "logging.level",
            &["STOCKROOM_TEST_UNSET_LEVEL"],
            Some(&doc),
            Some(std::path::Path::new("stockroom.toml")),
        );

        assert_eq!(source, "file (stockroom.toml)");
        assert_eq!(field_source("store.path", &[], Some(&doc), None), "default");
    }

    #[test]
    fn lines_render_key_value_and_source() {
        assert_eq!(
            render_line("store.path", "products.json", "default"),
            "- store.path = products.json (source: default)"
        );
    }

    #[test]
    fn blank_env_keys_fall_through_to_default() {
        std::env::set_var("STOCKROOM_TEST_BLANK_PATH", "  ");
        let source = field_source("store.path", &["STOCKROOM_TEST_BLANK_PATH"], None, None);
        std::env::remove_var("STOCKROOM_TEST_BLANK_PATH");

        assert_eq!(source, "default");
    }
}
