use std::error::Error;

use notefall::app::{FrameClock, Game, GameIo};
use notefall::config::{self, CONFIG_PATH, Config, GameMode};
use notefall::core::gfx::NullRenderer;
use notefall::core::input::{EventQueue, Modifiers};
use notefall::core::midi::{DRUM_CHANNEL, MidiInputSource, MidiOutputSink, ScriptedSource};
use winit::keyboard::KeyCode;

type MidiPorts = (Box<dyn MidiInputSource>, Box<dyn MidiOutputSink>);

const DEMO_TICKS_PER_QUARTER_NOTE: u16 = 480;
const DEMO_LEAD_IN_MS: f64 = 1000.0;

fn main() -> Result<(), Box<dyn Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let mut config = config::load(CONFIG_PATH);
    log::set_max_level(config.log_level.as_level_filter());

    let (midi_in, midi_out) = open_midi(&config)?;

    // Headless: pick the configured mode from the menu on the player's behalf.
    let ui = EventQueue::new();
    if config.show_menu {
        match config.game_mode {
            GameMode::Piano => ui.press(KeyCode::Digit1, Modifiers::empty()),
            GameMode::Drum => ui.press(KeyCode::Digit2, Modifiers::empty()),
            GameMode::Default => config.show_menu = false,
        }
    }

    let io = GameIo {
        midi_file: Box::new(demo_song(config.game_mode)),
        midi_in,
        midi_out,
        ui: Box::new(ui),
        renderer: Box::new(NullRenderer::default()),
    };
    let mut game = Game::new(config, io, FrameClock::wall());
    game.run();
    Ok(())
}

#[cfg(feature = "midi-device")]
fn open_midi(config: &Config) -> Result<MidiPorts, Box<dyn Error>> {
    use notefall::core::midi::MidiQueue;
    use notefall::core::midi_device::{DeviceInput, DeviceOutput};

    let midi_out = DeviceOutput::connect(&config.midi_output_port)?;
    let midi_in: Box<dyn MidiInputSource> = match DeviceInput::connect(&config.midi_input_port) {
        Ok(device) => Box::new(device),
        Err(e) => {
            // The keyboard still works without a MIDI instrument.
            log::warn!("{e}; continuing without MIDI input");
            Box::new(MidiQueue::new())
        }
    };
    Ok((midi_in, Box::new(midi_out)))
}

#[cfg(not(feature = "midi-device"))]
fn open_midi(_config: &Config) -> Result<MidiPorts, Box<dyn Error>> {
    use notefall::core::midi::{MidiLog, MidiQueue};

    log::info!("Built without the midi-device feature; MIDI output is discarded");
    Ok((Box::new(MidiQueue::new()), Box::new(MidiLog::new())))
}

/// A short built-in song: a C major scale, or a rock beat for the drum kit.
fn demo_song(mode: GameMode) -> ScriptedSource {
    let mut song = ScriptedSource::new(DEMO_TICKS_PER_QUARTER_NOTE);
    match mode {
        GameMode::Drum => {
            for beat in 0..16u8 {
                let at = DEMO_LEAD_IN_MS + f64::from(beat) * 400.0;
                let body = if beat % 2 == 0 { 36 } else { 38 };
                song = song
                    .with_note(at, 0, DRUM_CHANNEL, body, 100, 0.1)
                    .with_note(at, 0, DRUM_CHANNEL, 42, 80, 0.05);
            }
        }
        GameMode::Piano | GameMode::Default => {
            for (i, key) in [60u8, 62, 64, 65, 67, 69, 71, 72].into_iter().enumerate() {
                let at = DEMO_LEAD_IN_MS + i as f64 * 500.0;
                song = song.with_note(at, 0, 0, key, 100, 0.4);
            }
        }
    }
    song
}
