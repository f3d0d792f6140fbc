//! Game settings and preferences
//!
//! The mute flag lives under its own `gameMuted` key as `"true"`/`"false"`;
//! everything else is one JSON blob.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// All sound off (stored separately under `gameMuted`)
    #[serde(skip)]
    pub muted: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Pause when window loses focus
    pub pause_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Skip the background parallax and fade effects
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            pause_on_blur: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key for the JSON blob
    pub const STORAGE_KEY: &'static str = "doodle_jump_settings";
    /// Storage key for the mute flag
    pub const MUTED_KEY: &'static str = "gameMuted";

    /// Volume actually applied to effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Flip the mute flag and return the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Load settings; anything missing or unreadable falls back to defaults
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let mut settings = match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("Discarding unreadable settings: {err}");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("Could not read settings: {err}");
                Self::default()
            }
        };

        settings.muted = store
            .get_parsed::<bool>(Self::MUTED_KEY)
            .ok()
            .flatten()
            .unwrap_or(false);
        log::info!("Settings loaded (muted: {})", settings.muted);
        settings
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)
            .map_err(|err| StorageError::Rejected(err.to_string()))?;
        store.set(Self::STORAGE_KEY, &json)?;
        store.set(Self::MUTED_KEY, if self.muted { "true" } else { "false" })?;
        log::info!("Settings saved");
        Ok(())
    }
}
