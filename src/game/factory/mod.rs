//! Entity factories: one per instrument, plus the intro menu.

pub mod default;
pub mod drum;
pub mod menu;
pub mod piano;

use glam::DVec2;
use log::info;

use crate::config::{Config, GameMode};
use crate::core::gfx::{RectShape, Renderable};
use crate::core::input::KeyBinding;
use crate::game::capability::{
    Collidable, CollisionDetector, DeleteOffscreen, DetectorMode, Instrument,
    InstrumentCollisionHandler, InstrumentInputHandler, NoteInfo, Physics, SongNote,
    SongNoteCollisionHandler,
};
use crate::game::entity::Entity;
use crate::ui::color::BLACK;

pub use default::DefaultFactory;
pub use drum::DrumFactory;
pub use piano::PianoFactory;

pub const NOTE_OUTLINE_THICKNESS: f32 = 1.0;

/// Fall speed in px/ms for a song with the given resolution.
pub fn note_speed(ticks_per_quarter_note: u16, config: &Config) -> f64 {
    f64::from(ticks_per_quarter_note) / config.midi_ticks_per_speed_unit
        * config.fall_speed_multiplier
}

/// A note falls its own height over its duration.
#[inline(always)]
pub fn falling_note_height(duration_s: f64, speed: f64) -> f64 {
    duration_s * 1000.0 * speed
}

#[derive(Clone, Debug)]
pub enum InstrumentFactory {
    Default(DefaultFactory),
    Piano(PianoFactory),
    Drum(DrumFactory),
}

impl InstrumentFactory {
    /// `song_notes` are the song's distinct keys in first-appearance order;
    /// the drum kit uses them when no lanes are configured.
    pub fn for_mode(mode: GameMode, config: &Config, note_speed: f64, song_notes: &[u8]) -> Self {
        let factory = match mode {
            GameMode::Default => Self::Default(DefaultFactory::new(config, note_speed)),
            GameMode::Piano => Self::Piano(PianoFactory::new(config, note_speed)),
            GameMode::Drum => {
                let lanes = if config.drum_lanes.is_empty() {
                    song_notes
                } else {
                    &config.drum_lanes
                };
                Self::Drum(DrumFactory::new(config, note_speed, lanes))
            }
        };
        info!(
            "Using {} layout, note speed {:.3} px/ms",
            mode.as_str(),
            note_speed
        );
        factory
    }

    pub const fn mode(&self) -> GameMode {
        match self {
            Self::Default(_) => GameMode::Default,
            Self::Piano(_) => GameMode::Piano,
            Self::Drum(_) => GameMode::Drum,
        }
    }

    pub const fn note_speed(&self) -> f64 {
        match self {
            Self::Default(f) => f.note_speed(),
            Self::Piano(f) => f.note_speed(),
            Self::Drum(f) => f.note_speed(),
        }
    }

    pub const fn background_colour(&self) -> [f32; 4] {
        match self {
            Self::Default(_) => default::BACKGROUND_COLOUR,
            Self::Piano(_) => piano::BACKGROUND_COLOUR,
            Self::Drum(_) => drum::BACKGROUND_COLOUR,
        }
    }

    /// Whether falling notes for `key` can be placed by this layout.
    pub fn maps_key(&self, key: u8) -> bool {
        match self {
            Self::Default(_) => crate::game::layout::DefaultLayout::contains(key),
            Self::Piano(_) => crate::game::layout::PianoLayout::contains(key),
            Self::Drum(f) => f.layout().contains(key),
        }
    }

    pub fn create_instrument_row(&self) -> Vec<Entity> {
        match self {
            Self::Default(_) => Vec::new(),
            Self::Piano(f) => f.create_instrument_row(),
            Self::Drum(f) => f.create_instrument_row(),
        }
    }

    pub fn create_falling_note(
        &self,
        track: u16,
        channel: u8,
        key: u8,
        velocity: u8,
        duration_s: f64,
    ) -> Entity {
        let info = NoteInfo::new(Some(track), channel, key, velocity);
        match self {
            Self::Default(f) => f.create_falling_note(info, duration_s),
            Self::Piano(f) => f.create_falling_note(info, duration_s),
            Self::Drum(f) => f.create_falling_note(info, duration_s),
        }
    }

    pub fn create_note_play_effect(&self, source: &Entity) -> Entity {
        match self {
            Self::Piano(f) => f.create_note_play_effect(source),
            Self::Default(_) | Self::Drum(_) => placeholder(),
        }
    }
}

/// Zero-sized entity with no units; it is reaped after its first update.
pub fn placeholder() -> Entity {
    Entity::new(
        Renderable::Rect(RectShape::new(DVec2::ZERO, [0.0; 4])),
        DVec2::ZERO,
    )
}

/// A song note whose top edge reaches y = 0 at its hit time.
pub(crate) fn falling_note(
    x: f64,
    width: f64,
    fill: [f32; 4],
    info: NoteInfo,
    duration_s: f64,
    speed: f64,
    mode: DetectorMode,
) -> Entity {
    let height = falling_note_height(duration_s, speed);
    let rect = RectShape::new(DVec2::new(width, height), fill)
        .with_outline(BLACK, NOTE_OUTLINE_THICKNESS);
    Entity::new(Renderable::Rect(rect), DVec2::new(x, -height))
        .with(SongNote)
        .with(Collidable)
        .with(info)
        .with(Physics::new(0.0, speed))
        .with(DeleteOffscreen)
        .with(CollisionDetector::new(mode))
        .with(SongNoteCollisionHandler::default())
}

pub(crate) fn instrument_key(
    position: DVec2,
    rect: RectShape,
    info: NoteInfo,
    binding: KeyBinding,
    mode: DetectorMode,
) -> Entity {
    Entity::new(Renderable::Rect(rect), position)
        .with(Instrument)
        .with(info)
        .with(InstrumentInputHandler::new(binding))
        .with(CollisionDetector::new(mode))
        .with(InstrumentCollisionHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::capability::CapabilityKind;

    fn config(fall_speed: f64) -> Config {
        Config {
            fall_speed_multiplier: fall_speed,
            midi_ticks_per_speed_unit: 480.0,
            ..Config::default()
        }
    }

    #[test]
    fn note_speed_scales_resolution() {
        assert_eq!(note_speed(480, &config(2.0)), 2.0);
        assert_eq!(note_speed(96, &config(1.0)), 0.2);
    }

    #[test]
    fn falling_note_spawns_one_height_above_the_screen() {
        for mode in [GameMode::Default, GameMode::Piano, GameMode::Drum] {
            let cfg = config(2.0);
            let f = InstrumentFactory::for_mode(mode, &cfg, 2.0, &[60]);
            let note = f.create_falling_note(0, 0, 60, 100, 0.5);
            assert_eq!(note.size().y, 1000.0, "{mode:?}");
            assert_eq!(note.position().y, -1000.0, "{mode:?}");
            for kind in [
                CapabilityKind::SongNote,
                CapabilityKind::Collidable,
                CapabilityKind::NoteInfo,
                CapabilityKind::Physics,
                CapabilityKind::DeleteOffscreen,
                CapabilityKind::CollisionDetector,
                CapabilityKind::CollisionHandler,
            ] {
                assert!(note.has(kind), "{mode:?} note lacks {kind:?}");
            }
            assert_eq!(note.get::<Physics>().map(|p| p.velocity.y), Some(2.0));
        }
    }

    #[test]
    fn zero_duration_notes_are_flat() {
        let cfg = config(1.0);
        let f = InstrumentFactory::for_mode(GameMode::Piano, &cfg, 1.0, &[]);
        let note = f.create_falling_note(3, 1, 61, 64, 0.0);
        assert_eq!(note.size().y, 0.0);
        assert_eq!(note.position().y, 0.0);
    }

    #[test]
    fn placeholder_effects_are_reaped() {
        let cfg = Config::default();
        let f = InstrumentFactory::for_mode(GameMode::Drum, &cfg, 1.0, &[36]);
        let source = f.create_falling_note(0, 9, 36, 100, 0.1);
        let effect = f.create_note_play_effect(&source);
        assert_eq!(effect.size(), DVec2::ZERO);
        assert_eq!(effect.unit_count(), 0);
    }

    #[test]
    fn configured_drum_lanes_win_over_song_notes() {
        let cfg = Config {
            drum_lanes: vec![42, 36],
            ..Config::default()
        };
        let f = InstrumentFactory::for_mode(GameMode::Drum, &cfg, 1.0, &[36, 38]);
        assert!(f.maps_key(42));
        assert!(!f.maps_key(38));
        assert_eq!(f.create_instrument_row().len(), 2);
    }

    #[test]
    fn default_factory_has_no_instrument() {
        let cfg = Config::default();
        let f = InstrumentFactory::for_mode(GameMode::Default, &cfg, 1.0, &[]);
        assert!(f.create_instrument_row().is_empty());
        assert!(f.maps_key(0) && f.maps_key(127));
    }
}
