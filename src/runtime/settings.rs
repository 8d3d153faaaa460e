use crate::config::Settings;

/// Load settings, falling back to defaults when the file or environment is
/// unusable. The second value is a warning for the status line, since
/// anything printed before the alternate screen opens is lost.
pub fn load_settings() -> (Settings, Option<String>) {
    match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                Settings::default(),
                Some(format!("Invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("Failed to load config, using defaults: {e}")),
        ),
    }
}
