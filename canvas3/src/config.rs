//! Key/value configuration, layered by priority, and command line options.

use std::{ffi::OsString, path::Path, sync::Arc};

use indexmap::IndexMap;
use parking_lot::RwLock;
use pico_args::Arguments;

use crate::error::ConfigError;

/// Priority of defaults shipped with a plugin or driver.
pub const PRIORITY_PLUGIN: i32 = 0;
/// Priority of the application's own configuration.
pub const PRIORITY_APPLICATION: i32 = 100;
/// Priority of per-user configuration.
pub const PRIORITY_USER: i32 = 200;
/// Priority of values given on the command line.
pub const PRIORITY_COMMAND_LINE: i32 = 300;

/// Configuration shared between the canvas, the driver and the driver database.
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Parses a configuration boolean. Returns `None` for anything unrecognized.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    let any = |options: &[&str]| options.iter().any(|o| value.eq_ignore_ascii_case(o));
    if any(&["yes", "true", "on", "1"]) {
        Some(true)
    } else if any(&["no", "false", "off", "0"]) {
        Some(false)
    } else {
        None
    }
}

/// Read access to configuration values. Keys are case insensitive.
pub trait ConfigSource {
    fn get_str(&self, key: &str) -> Option<&str>;

    fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get_str(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_str(key).and_then(parse_bool).unwrap_or(default)
    }

    fn key_exists(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }
}

#[derive(Debug, Clone)]
struct ConfigEntry {
    key: String,
    value: String,
}

/// A single flat set of configuration values, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    entries: IndexMap<String, ConfigEntry>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Tables flatten into dotted keys, so
    /// `[Video] ScreenWidth = 800` and `Video.ScreenWidth = 800` are the same
    /// setting. Arrays become comma separated lists.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut file = Self::new();
        file.insert_table(None, table)?;
        Ok(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::parse(&text)
    }

    fn insert_table(&mut self, prefix: Option<&str>, table: toml::Table) -> Result<(), ConfigError> {
        for (key, value) in table {
            let key = match prefix {
                Some(prefix) => format!("{prefix}.{key}"),
                None => key,
            };
            match value {
                toml::Value::Table(table) => self.insert_table(Some(&key), table)?,
                value => {
                    let value = config_value(&key, value)?;
                    self.set(&key, value);
                }
            }
        }
        Ok(())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut file = Self::new();
        for (key, value) in pairs {
            file.set(key, value);
        }
        file
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(
            key.to_ascii_lowercase(),
            ConfigEntry {
                key: key.to_owned(),
                value: value.into(),
            },
        );
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries
            .shift_remove(&key.to_ascii_lowercase())
            .map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs with keys in their original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }
}

fn config_value(key: &str, value: toml::Value) -> Result<String, ConfigError> {
    Ok(match value {
        toml::Value::String(value) => value,
        toml::Value::Integer(value) => value.to_string(),
        toml::Value::Float(value) => value.to_string(),
        toml::Value::Boolean(value) => value.to_string(),
        toml::Value::Datetime(value) => value.to_string(),
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                toml::Value::Array(_) | toml::Value::Table(_) => Err(ConfigError::UnsupportedValue {
                    key: key.to_owned(),
                }),
                item => config_value(key, item),
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(","),
        toml::Value::Table(_) => return Err(ConfigError::UnsupportedValue { key: key.to_owned() }),
    })
}

impl ConfigSource for ConfigFile {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(|entry| entry.value.as_str())
    }
}

#[derive(Debug)]
struct ConfigLayer {
    priority: i32,
    name: String,
    file: ConfigFile,
}

/// A stack of [`ConfigFile`]s. Lookups return the value from the layer with
/// the highest priority; layers of equal priority are searched newest first.
#[derive(Debug, Default)]
pub struct ConfigManager {
    layers: Vec<ConfigLayer>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Adds a layer, replacing any existing layer with the same name.
    pub fn add_layer(&mut self, name: &str, priority: i32, file: ConfigFile) {
        self.remove_layer(name);
        let position = self
            .layers
            .iter()
            .position(|layer| layer.priority <= priority)
            .unwrap_or(self.layers.len());
        self.layers.insert(
            position,
            ConfigLayer {
                priority,
                name: name.to_owned(),
                file,
            },
        );
    }

    pub fn remove_layer(&mut self, name: &str) -> Option<ConfigFile> {
        let position = self.layers.iter().position(|layer| layer.name == name)?;
        Some(self.layers.remove(position).file)
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.name == name)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl ConfigSource for ConfigManager {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.file.get_str(key))
    }
}

/// Command line arguments, queried by option key.
///
/// Keys include their dashes, like `"-mode"`. Values may be given as
/// `-mode=800x600` or `-mode 800x600`.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The arguments of this process, without the program name.
    pub fn from_env() -> Self {
        Self::parse(std::env::args_os().skip(1))
    }

    fn arguments(&self) -> Arguments {
        Arguments::from_vec(self.args.clone())
    }

    pub fn has_option(&self, key: &'static str) -> bool {
        let mut args = self.arguments();
        args.contains(key) || option_arg(args.opt_value_from_str::<_, String>(key)).is_some()
    }

    /// Value given to `key`, if any.
    pub fn option(&self, key: &'static str) -> Option<String> {
        option_arg(self.arguments().opt_value_from_str(key))
    }

    /// `on` (or `on=yes`) means true, `off` means false.
    pub fn bool_option(&self, on: &'static str, off: &'static str) -> Option<bool> {
        let mut args = self.arguments();
        if args.contains(on) {
            return Some(true);
        }
        if let Some(value) = option_arg(args.opt_value_from_str::<_, String>(on)) {
            return parse_bool(&value);
        }
        args.contains(off).then_some(false)
    }
}

fn option_arg<T>(result: Result<Option<T>, pico_args::Error>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(pico_args::Error::OptionWithoutAValue(key)) => {
            log::debug!("Command line option {key} has no value");
            None
        }
        Err(e) => {
            log::warn!("Ignoring command line option: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file() {
        let file = ConfigFile::parse(
            r#"
# comment
[Video]
ScreenWidth = 800
FullScreen = true
WindowTitle = "a = b"

[Video.OpenGL.FormatPicker]
DepthBits = [32, 24, 16]
"#,
        )
        .unwrap();
        assert_eq!(file.len(), 4);
        assert_eq!(file.get_int("video.screenwidth", 0), 800);
        assert!(file.get_bool("Video.FullScreen", false));
        assert_eq!(file.get_str("Video.WindowTitle"), Some("a = b"));
        assert_eq!(file.get_str("Video.OpenGL.FormatPicker.DepthBits"), Some("32,24,16"));
        assert_eq!(file.iter().next(), Some(("Video.ScreenWidth", "800")));
    }

    #[test]
    fn dotted_keys_match_tables() {
        let file = ConfigFile::parse("Video.VSync = \"yes\"\nVideo.OpenGL.DepthBits = 24\n").unwrap();
        assert!(file.get_bool("Video.VSync", false));
        assert_eq!(file.get_int("Video.OpenGL.DepthBits", 0), 24);
    }

    #[test]
    fn parse_file_rejects_garbage() {
        assert!(matches!(
            ConfigFile::parse("Video.ScreenWidth = 1\nnonsense\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            ConfigFile::parse("Video.Modes = [[640, 480]]\n"),
            Err(ConfigError::UnsupportedValue { key }) if key == "Video.Modes"
        ));
    }

    #[test]
    fn defaults_on_bad_values() {
        let file = ConfigFile::from_pairs([("a", "twelve"), ("b", "maybe")]);
        assert_eq!(file.get_int("a", 7), 7);
        assert!(file.get_bool("b", true));
        assert_eq!(file.get_str_or("c", "fallback"), "fallback");
    }

    #[test]
    fn layers_by_priority() {
        let mut manager = ConfigManager::new();
        manager.add_layer("app", PRIORITY_APPLICATION, ConfigFile::from_pairs([("k", "app"), ("only", "x")]));
        manager.add_layer("cmd", PRIORITY_COMMAND_LINE, ConfigFile::from_pairs([("k", "cmd")]));
        manager.add_layer("plugin", PRIORITY_PLUGIN, ConfigFile::from_pairs([("k", "plugin")]));
        assert_eq!(manager.get_str("k"), Some("cmd"));
        assert_eq!(manager.get_str("only"), Some("x"));

        manager.remove_layer("cmd");
        assert_eq!(manager.get_str("k"), Some("app"));
        assert_eq!(manager.layer_count(), 2);
    }

    #[test]
    fn command_line_options() {
        let cmd = CommandLine::parse(["-sysmouse", "-mode=800x600", "-nofullscreen", "-depth", "16", "-vsync=no"]);
        assert_eq!(cmd.bool_option("-sysmouse", "-nosysmouse"), Some(true));
        assert_eq!(cmd.bool_option("-fullscreen", "-nofullscreen"), Some(false));
        assert_eq!(cmd.bool_option("-vsync", "-novsync"), Some(false));
        assert_eq!(cmd.bool_option("-gamma", "-nogamma"), None);
        assert_eq!(cmd.option("-mode").as_deref(), Some("800x600"));
        assert_eq!(cmd.option("-depth").as_deref(), Some("16"));
        assert!(cmd.has_option("-sysmouse"));
        assert!(cmd.has_option("-mode"));
        assert!(!cmd.has_option("-title"));
        // Queries never consume arguments.
        assert_eq!(cmd.option("-mode").as_deref(), Some("800x600"));
    }
}
