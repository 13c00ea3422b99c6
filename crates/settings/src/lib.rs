pub mod paths;
pub mod preferences;

pub use paths::{AppPaths, DATA_DIR_ENV};
pub use preferences::{
    AutosavePreferences, Preferences, PreferencesError, PreferencesStore, SessionPreferences,
};
