use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// Title used when a game ships no usable `meta.yml`.
pub const UNKNOWN_TITLE: &str = "unknown game (meta data incomplete)";

/// Metadata describing a game, read from its `meta.yml`.
///
/// Gives convenient access to the title while keeping every other field
/// reachable through [`GameMeta::get`].
///
/// # Examples
///
/// ```
/// # use crafting_calculator::parse_meta;
/// let meta = parse_meta("title: Yonder\nversion: 1.2").unwrap();
/// assert_eq!(meta.title(), Some("Yonder"));
/// assert!(meta.get("version").is_some());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GameMeta {
    #[serde(flatten)]
    pub(super) data: HashMap<String, Value>,
}

impl GameMeta {
    /// Returns the game title from metadata.
    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(|v| v.as_str())
    }

    /// Returns the game title, or a placeholder when none is present.
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or(UNKNOWN_TITLE)
    }

    /// Returns a metadata value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Parse the content of a `meta.yml` file.
/// Returns None if the content is empty, invalid YAML or not a mapping
pub fn parse_meta(content: &str) -> Option<GameMeta> {
    if content.trim().is_empty() {
        return None;
    }

    serde_yaml::from_str::<HashMap<String, Value>>(content)
        .ok()
        .map(|data| GameMeta { data })
}
