//! TOML-backed configuration, replacing a Lua `config` table with a
//! `serde`-deserialized struct and `stty`/shell-resolution defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The 256-entry default color palette: 16 ANSI colors, a 6x6x6 color
/// cube, then a 24-step grayscale ramp, matching the standard xterm
/// palette every terminal of this kind ships.
fn default_palette() -> [(u8, u8, u8); 256] {
    let mut palette = [(0u8, 0u8, 0u8); 256];

    const ANSI: [(u8, u8, u8); 16] = [
        (0, 0, 0), (205, 0, 0), (0, 205, 0), (205, 205, 0),
        (0, 0, 238), (205, 0, 205), (0, 205, 205), (229, 229, 229),
        (127, 127, 127), (255, 0, 0), (0, 255, 0), (255, 255, 0),
        (92, 92, 255), (255, 0, 255), (0, 255, 255), (255, 255, 255),
    ];
    palette[..16].copy_from_slice(&ANSI);

    let ramp = [0u8, 95, 135, 175, 215, 255];
    for i in 0..216 {
        let r = ramp[i / 36];
        let g = ramp[(i / 6) % 6];
        let b = ramp[i % 6];
        palette[16 + i] = (r, g, b);
    }

    for i in 0..24 {
        let v = 8 + (i as u16 * 10) as u8;
        palette[232 + i] = (v, v, v);
    }

    palette
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exported as `TERM` for the child shell.
    pub term_name: String,
    /// Used only when no shell can be resolved any other way.
    pub default_shell: String,
    /// Extra arguments passed through to `stty` when opening a direct
    /// line device.
    pub stty_args: String,
    pub cols: u16,
    pub rows: u16,
    pub tabspaces: u16,
    /// Milliseconds between cursor blink toggles; `0` disables blinking.
    pub blink_timeout_ms: u64,
    /// Seconds the reactor coalesces redraws for.
    pub refresh_rate_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            term_name: "xterm-256color".to_string(),
            default_shell: "/bin/sh".to_string(),
            stty_args: "raw pass8 nl -echo -iexten -cstopb 38400".to_string(),
            cols: 80,
            rows: 24,
            tabspaces: 8,
            blink_timeout_ms: 800,
            refresh_rate_hz: 60,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::Parse(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl Config {
    /// Default config file location: `$XDG_CONFIG_HOME/<name>/config.toml`,
    /// falling back to `~/.config/<name>/config.toml`.
    #[must_use]
    pub fn default_path(name: &str) -> Option<PathBuf> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(name).join("config.toml"));
        }
        std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config").join(name).join("config.toml"))
    }

    /// Load from `path` if it exists; otherwise return the defaults.
    /// A path that exists but fails to parse is an error rather than a
    /// silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(?path, "no config file found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&text).map_err(Error::Parse)
    }

    #[must_use]
    pub fn palette(&self) -> [(u8, u8, u8); 256] {
        default_palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_80x24() {
        let config = Config::default();
        assert_eq!((config.cols, config.rows), (80, 24));
    }

    #[test]
    fn palette_first_sixteen_match_ansi() {
        let config = Config::default();
        let palette = config.palette();
        assert_eq!(palette[1], (205, 0, 0));
        assert_eq!(palette[9], (255, 0, 0));
    }

    #[test]
    fn palette_grayscale_ramp_is_monotonic() {
        let config = Config::default();
        let palette = config.palette();
        assert!(palette[232].0 < palette[255].0);
    }

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.cols, 80);
    }

    #[test]
    fn none_path_returns_defaults_without_touching_disk() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.rows, 24);
    }

    #[test]
    fn parses_partial_overrides() {
        let toml = "cols = 100\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cols, 100);
        assert_eq!(config.rows, 24);
    }
}
