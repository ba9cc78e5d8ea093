//! Engine settings - parses `settings.data`.
//!
//! Flat `section.key: value` lines. Anything unknown or unparseable keeps
//! the default; the file can be partial or missing entirely.

use std::path::Path;
use std::str::FromStr;

/// Tunables for the engine, the brush and the debug overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// Target frame pacing for drivers, milliseconds.
    pub render_interval: f64,
    /// Fixed physics timestep, milliseconds.
    pub physics_interval: f64,
    pub brush_size: u32,
    pub brush_max_size: u32,
    /// Brush radius change per wheel delta unit.
    pub brush_sensitivity: f64,
    pub debug_start_enabled: bool,
    pub overlay_start_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: 342,
            height: 192,
            render_interval: 16.667,
            physics_interval: 25.0,
            brush_size: 4,
            brush_max_size: 42,
            brush_sensitivity: 0.02,
            debug_start_enabled: false,
            overlay_start_enabled: false,
        }
    }
}

impl Settings {
    pub fn from_data_text(text: &str) -> Settings {
        let mut settings = Settings::default();
        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                log::warn!("settings.data:{}: not a 'key: value' line", lineno);
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "engine.width" => parse_into(&mut settings.width, key, value),
                "engine.height" => parse_into(&mut settings.height, key, value),
                "engine.render_interval" => parse_into(&mut settings.render_interval, key, value),
                "engine.physics_interval" => parse_into(&mut settings.physics_interval, key, value),
                "input.brush_size" => parse_into(&mut settings.brush_size, key, value),
                "input.brush_max_size" => parse_into(&mut settings.brush_max_size, key, value),
                "input.brush_sensitivity" => {
                    parse_into(&mut settings.brush_sensitivity, key, value)
                }
                "debug.start_enabled" => parse_into(&mut settings.debug_start_enabled, key, value),
                "debug.overlay_start_enabled" => {
                    parse_into(&mut settings.overlay_start_enabled, key, value)
                }
                _ => log::warn!("settings.data:{}: ignoring unknown key '{}'", lineno, key),
            }
        }
        settings
    }

    /// Load and parse a file; I/O failure is the only fatal path.
    pub fn from_file(path: &Path) -> Result<Settings, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Ok(Self::from_data_text(&text))
    }
}

fn parse_into<T: FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => log::warn!("settings.data: ignoring bad value '{}' for '{}'", value, key),
    }
}
