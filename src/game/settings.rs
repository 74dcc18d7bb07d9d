use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::storage::{self, KeyValueStore, SETTINGS_KEY};

pub const MAX_VOLUME: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Theme::Auto),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub sound_enabled: bool,
    #[serde(rename = "volume")]
    pub volume_percent: u8,
    pub auto_flip: bool,
    pub show_timer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: Theme::Auto,
            sound_enabled: true,
            volume_percent: 50,
            auto_flip: true,
            show_timer: true,
        }
    }
}

/// Partial update; `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub sound_enabled: Option<bool>,
    #[serde(rename = "volume")]
    pub volume_percent: Option<u8>,
    pub auto_flip: Option<bool>,
    pub show_timer: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    /// Field-by-field read of a stored document. Unknown keys and fields of the wrong type are skipped.
    fn from_document(doc: &Map<String, Value>) -> Self {
        SettingsPatch {
            theme: field(doc, "theme"),
            sound_enabled: field(doc, "soundEnabled"),
            volume_percent: field::<u64>(doc, "volume").map(|v| v.min(u64::from(MAX_VOLUME)) as u8),
            auto_flip: field(doc, "autoFlip"),
            show_timer: field(doc, "showTimer"),
        }
    }
}

fn field<T: DeserializeOwned>(doc: &Map<String, Value>, key: &str) -> Option<T> {
    let value = doc.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::debug!(key, error = %err, "ignoring stored setting");
            None
        }
    }
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(sound_enabled) = patch.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(volume) = patch.volume_percent {
            self.volume_percent = volume.min(MAX_VOLUME);
        }
        if let Some(auto_flip) = patch.auto_flip {
            self.auto_flip = auto_flip;
        }
        if let Some(show_timer) = patch.show_timer {
            self.show_timer = show_timer;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SettingsStore {
    current: Settings,
}

impl SettingsStore {
    /// Stored values layered over the defaults. Never fails.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut current = Settings::default();
        match storage::load_json::<Value, _>(store, SETTINGS_KEY) {
            Ok(Some(Value::Object(doc))) => current.apply(&SettingsPatch::from_document(&doc)),
            Ok(Some(_)) => tracing::warn!("stored settings are not an object, using defaults"),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not load settings, using defaults"),
        }
        SettingsStore { current }
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    pub fn update<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, patch: &SettingsPatch) {
        self.current.apply(patch);
        self.save(store);
    }

    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) {
        self.current = Settings::default();
        self.save(store);
    }

    fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        if let Err(err) = storage::save_json(store, SETTINGS_KEY, &self.current) {
            tracing::warn!(error = %err, "could not save settings");
        }
    }
}
