use crate::core::input::{Modifiers, parse_key_token};
use log::{LevelFilter, info, warn};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use winit::keyboard::KeyCode;

pub const CONFIG_PATH: &str = "notefall.ini";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content);
        Ok(())
    }

    pub fn load_str(&mut self, content: &str) {
        self.sections.clear();

        let mut current_section: Option<String> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                let section = line[1..line.len() - 1].trim().to_string();
                current_section = Some(section.clone());
                self.sections.entry(section).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some(eq_idx) = line.find('=') {
                let (key_raw, value_raw) = line.split_at(eq_idx);
                let key = key_raw.trim();
                if key.is_empty() {
                    continue;
                }
                let value = value_raw[1..].trim().to_string();
                let section = current_section.clone().unwrap_or_default();
                self.sections
                    .entry(section)
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }

    pub fn get_section(&self, section: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(section)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameMode {
    /// No instrument row; notes fall in 128 equal lanes.
    #[default]
    Default,
    Piano,
    Drum,
}

impl GameMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Piano => "piano",
            Self::Drum => "drum",
        }
    }
}

impl FromStr for GameMode {
    type Err = ();

    /// Never fails: anything that is not a known instrument is `Default`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "piano" => Self::Piano,
            "drum" => Self::Drum,
            _ => Self::Default,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

/// Explicit overrides of the instrument key bindings, keyed by MIDI key and
/// the modifiers that must be held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyBindingOverrides {
    map: FxHashMap<(u8, Modifiers), KeyCode>,
}

impl KeyBindingOverrides {
    pub fn insert(&mut self, midi_key: u8, modifiers: Modifiers, key: KeyCode) {
        self.map.insert((midi_key, modifiers), key);
    }

    pub fn get(&self, midi_key: u8, modifiers: Modifiers) -> Option<KeyCode> {
        self.map.get(&(midi_key, modifiers)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub display_width: u32,
    pub display_height: u32,
    pub fullscreen: bool,
    pub max_fps: u32,
    pub fall_speed_multiplier: f64,
    /// MIDI file ticks that make up one unit (1 px/ms) of fall speed.
    pub midi_ticks_per_speed_unit: f64,
    pub midi_out_velocity: u8,
    pub game_mode: GameMode,
    /// Instrument keys press themselves when a matching note reaches them.
    pub auto_play: bool,
    pub show_menu: bool,
    pub log_level: LogLevel,
    /// Substring of the MIDI port name to use; empty picks the first port.
    pub midi_input_port: String,
    pub midi_output_port: String,
    /// Drum lanes in display order. Empty derives lanes from the song.
    pub drum_lanes: Vec<u8>,
    pub key_bindings: KeyBindingOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_width: 1024,
            display_height: 768,
            fullscreen: false,
            max_fps: 60,
            fall_speed_multiplier: 1.0,
            midi_ticks_per_speed_unit: 1000.0,
            midi_out_velocity: 100,
            game_mode: GameMode::Piano,
            auto_play: false,
            show_menu: true,
            log_level: LogLevel::Warn,
            midi_input_port: String::new(),
            midi_output_port: String::new(),
            drum_lanes: Vec::new(),
            key_bindings: KeyBindingOverrides::default(),
        }
    }
}

impl Config {
    #[inline(always)]
    pub fn screen_width(&self) -> f64 {
        f64::from(self.display_width)
    }

    #[inline(always)]
    pub fn screen_height(&self) -> f64 {
        f64::from(self.display_height)
    }

    /// Physical key configured for `midi_key` under the given modifiers, if
    /// the player overrode the instrument's own binding.
    pub fn key_for_note(&self, midi_key: u8, ctrl: bool, shift: bool) -> Option<KeyCode> {
        self.key_bindings
            .get(midi_key, Modifiers::from_flags(ctrl, shift))
    }

    /// Builds a config from parsed INI data, falling back to defaults for
    /// missing or malformed keys.
    pub fn from_ini(conf: &SimpleIni) -> Self {
        let default = Self::default();
        let flag = |key: &str, fallback: bool| {
            conf.get("Options", key)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(fallback)
        };

        Self {
            display_width: conf
                .get("Options", "DisplayWidth")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(default.display_width),
            display_height: conf
                .get("Options", "DisplayHeight")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(default.display_height),
            fullscreen: flag("Fullscreen", default.fullscreen),
            max_fps: conf
                .get("Options", "MaxFps")
                .and_then(|v| v.parse::<u32>().ok())
                .map_or(default.max_fps, |v| v.clamp(1, 1000)),
            fall_speed_multiplier: conf
                .get("Options", "FallSpeedMultiplier")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default.fall_speed_multiplier),
            midi_ticks_per_speed_unit: conf
                .get("Options", "MidiTicksPerSpeedUnit")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default.midi_ticks_per_speed_unit),
            midi_out_velocity: conf
                .get("Options", "MidiOutVelocity")
                .and_then(|v| v.parse::<u8>().ok())
                .map_or(default.midi_out_velocity, |v| v.min(127)),
            game_mode: conf
                .get("Options", "GameMode")
                .and_then(|v| GameMode::from_str(&v).ok())
                .unwrap_or(default.game_mode),
            auto_play: flag("AutoPlay", default.auto_play),
            show_menu: flag("ShowMenu", default.show_menu),
            log_level: conf
                .get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level),
            midi_input_port: conf
                .get("Options", "MidiInputPort")
                .unwrap_or(default.midi_input_port),
            midi_output_port: conf
                .get("Options", "MidiOutputPort")
                .unwrap_or(default.midi_output_port),
            drum_lanes: conf
                .get("Options", "DrumLanes")
                .map(|v| parse_key_list(&v))
                .unwrap_or(default.drum_lanes),
            key_bindings: load_key_bindings(conf),
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") || v.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

fn parse_key_list(v: &str) -> Vec<u8> {
    v.split(',')
        .filter_map(|tok| tok.trim().parse::<u8>().ok())
        .filter(|&k| k < 128)
        .collect()
}

/// Parses a `[KeyBindings]` key such as `60`, `61+Shift` or `61+Ctrl+Shift`.
fn parse_binding_lhs(lhs: &str) -> Option<(u8, Modifiers)> {
    let mut parts = lhs.split('+');
    let midi_key = parts.next()?.trim().parse::<u8>().ok().filter(|&k| k < 128)?;
    let mut modifiers = Modifiers::empty();
    for part in parts {
        match part.trim().to_ascii_lowercase().as_str() {
            "shift" => modifiers |= Modifiers::SHIFT,
            "ctrl" | "control" => modifiers |= Modifiers::CTRL,
            _ => return None,
        }
    }
    Some((midi_key, modifiers))
}

fn load_key_bindings(conf: &SimpleIni) -> KeyBindingOverrides {
    let mut out = KeyBindingOverrides::default();
    let Some(section) = conf.get_section("KeyBindings") else {
        return out;
    };
    for (lhs, rhs) in section {
        match (parse_binding_lhs(lhs), parse_key_token(rhs)) {
            (Some((midi_key, modifiers)), Some(key)) => out.insert(midi_key, modifiers, key),
            _ => warn!("Ignoring malformed key binding '{lhs}={rhs}'"),
        }
    }
    out
}

fn default_config_text() -> String {
    let d = Config::default();
    let mut content = String::new();
    content.push_str("[Options]\n");
    content.push_str("AutoPlay=0\n");
    content.push_str(&format!("DisplayHeight={}\n", d.display_height));
    content.push_str(&format!("DisplayWidth={}\n", d.display_width));
    content.push_str("DrumLanes=\n");
    content.push_str(&format!("FallSpeedMultiplier={}\n", d.fall_speed_multiplier));
    content.push_str("Fullscreen=0\n");
    content.push_str(&format!("GameMode={}\n", d.game_mode.as_str()));
    content.push_str(&format!("LogLevel={}\n", d.log_level.as_str()));
    content.push_str(&format!("MaxFps={}\n", d.max_fps));
    content.push_str("MidiInputPort=\n");
    content.push_str(&format!("MidiOutVelocity={}\n", d.midi_out_velocity));
    content.push_str("MidiOutputPort=\n");
    content.push_str(&format!(
        "MidiTicksPerSpeedUnit={}\n",
        d.midi_ticks_per_speed_unit
    ));
    content.push_str("ShowMenu=1\n");
    content.push('\n');
    content.push_str("[KeyBindings]\n");
    content.push_str("; 60=KeyCode::KeyA\n");
    content.push_str("; 61+Shift=KeyCode::KeyA\n");
    content
}

/// Loads the config at `path`, writing a default file first when it does
/// not exist. Unreadable files fall back to defaults.
pub fn load<P: AsRef<Path>>(path: P) -> Config {
    let path = path.as_ref();
    if !path.exists() {
        info!("'{}' not found, creating with default values.", path.display());
        if let Err(e) = std::fs::write(path, default_config_text()) {
            warn!("Failed to create default config file: {e}");
        }
    }

    let mut conf = SimpleIni::new();
    match conf.load(path) {
        Ok(()) => {
            let cfg = Config::from_ini(&conf);
            info!(
                "Loaded '{}' (mode {}, {}x{})",
                path.display(),
                cfg.game_mode.as_str(),
                cfg.display_width,
                cfg.display_height
            );
            cfg
        }
        Err(e) => {
            warn!("Failed to load '{}': {e}. Using defaults.", path.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        let mut ini = SimpleIni::new();
        ini.load_str(text);
        Config::from_ini(&ini)
    }

    #[test]
    fn empty_ini_yields_defaults() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn options_are_read_and_sanitised() {
        let cfg = parse(
            "[Options]\nDisplayWidth=1300\nDisplayHeight=0\nGameMode=DRUM\n\
             FallSpeedMultiplier=-2\nMidiOutVelocity=200\nAutoPlay=yes\nShowMenu=0\n\
             DrumLanes=36, 38,x,42,300\nLogLevel=debug\n",
        );
        assert_eq!(cfg.display_width, 1300);
        assert_eq!(cfg.display_height, Config::default().display_height);
        assert_eq!(cfg.game_mode, GameMode::Drum);
        assert_eq!(cfg.fall_speed_multiplier, 1.0);
        assert_eq!(cfg.midi_out_velocity, 127);
        assert!(cfg.auto_play);
        assert!(!cfg.show_menu);
        assert_eq!(cfg.drum_lanes, vec![36, 38, 42]);
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn unknown_game_mode_falls_back_to_default_factory() {
        assert_eq!(parse("[Options]\nGameMode=banjo\n").game_mode, GameMode::Default);
    }

    #[test]
    fn key_binding_overrides_respect_modifiers() {
        let cfg = parse(
            "[KeyBindings]\n60=KeyCode::KeyA\n61+Shift=KeyCode::KeyA\n62+Hyper=KeyCode::KeyB\n",
        );
        assert_eq!(cfg.key_for_note(60, false, false), Some(KeyCode::KeyA));
        assert_eq!(cfg.key_for_note(60, false, true), None);
        assert_eq!(cfg.key_for_note(61, false, true), Some(KeyCode::KeyA));
        assert_eq!(cfg.key_for_note(62, false, false), None);
    }

    #[test]
    fn load_creates_missing_file_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_PATH);
        let cfg = load(&path);
        assert!(path.exists(), "default config should be written");
        assert_eq!(cfg, Config::default());

        // Written defaults must round-trip through the reader.
        let again = load(&path);
        assert_eq!(again, cfg);
    }

    #[test]
    fn load_reads_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.ini");
        std::fs::write(&path, "[Options]\nGameMode=piano\nMaxFps=144\n").expect("write ini");
        let cfg = load(&path);
        assert_eq!(cfg.game_mode, GameMode::Piano);
        assert_eq!(cfg.max_fps, 144);
    }
}
