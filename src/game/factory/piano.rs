use glam::DVec2;

use crate::config::Config;
use crate::core::gfx::{RectShape, Renderable};
use crate::game::capability::{DetectorMode, Lifetime, NoteInfo, Physics};
use crate::game::entity::Entity;
use crate::game::factory::{falling_note, instrument_key};
use crate::game::layout::PianoLayout;
use crate::ui::color::{
    BLACK, DARKEN_MULTIPLIER, WHITE, darken_rgba, lighten_rgba, rgba_hex, track_rgba,
};

pub const BACKGROUND_COLOUR: [f32; 4] = rgba_hex("#161616");
pub const WHITE_KEY_HEIGHT: f64 = 120.0;
pub const BLACK_KEY_HEIGHT: f64 = 75.0;
/// Gap below the keyboard, as a fraction of the screen height.
pub const KEY_HOVER_PERCENTAGE: f64 = 0.02;
pub const WHITE_KEY_OUTLINE_THICKNESS: f32 = 1.0;
pub const BLACK_KEY_OUTLINE_THICKNESS: f32 = 2.0;
pub const EFFECT_HEIGHT: f64 = 12.0;
pub const EFFECT_RISE_SPEED: f64 = 0.15;
pub const EFFECT_LIFETIME_MS: f64 = 200.0;

#[derive(Clone, Debug)]
pub struct PianoFactory {
    layout: PianoLayout,
    note_speed: f64,
    screen_height: f64,
    out_velocity: u8,
}

impl PianoFactory {
    pub fn new(config: &Config, note_speed: f64) -> Self {
        Self {
            layout: PianoLayout::new(config.screen_width()),
            note_speed,
            screen_height: config.screen_height(),
            out_velocity: config.midi_out_velocity,
        }
    }

    pub const fn note_speed(&self) -> f64 {
        self.note_speed
    }

    pub const fn layout(&self) -> &PianoLayout {
        &self.layout
    }

    /// Top edge of the keyboard.
    pub fn keyboard_y(&self) -> f64 {
        self.screen_height - WHITE_KEY_HEIGHT - self.screen_height * KEY_HOVER_PERCENTAGE
    }

    /// All 88 keys; black keys come after the white ones so they draw on top.
    pub fn create_instrument_row(&self) -> Vec<Entity> {
        let (white, black): (Vec<u8>, Vec<u8>) =
            PianoLayout::keys().partition(|&k| !PianoLayout::is_black_key(k));
        white
            .into_iter()
            .chain(black)
            .map(|key| self.create_instrument_key(key))
            .collect()
    }

    fn create_instrument_key(&self, key: u8) -> Entity {
        let (height, fill, outline) = if PianoLayout::is_black_key(key) {
            (BLACK_KEY_HEIGHT, BLACK, BLACK_KEY_OUTLINE_THICKNESS)
        } else {
            (WHITE_KEY_HEIGHT, WHITE, WHITE_KEY_OUTLINE_THICKNESS)
        };
        let rect = RectShape::new(DVec2::new(self.layout.key_width(key), height), fill)
            .with_outline(BLACK, outline);
        instrument_key(
            DVec2::new(self.layout.x_position(key), self.keyboard_y()),
            rect,
            NoteInfo::new(None, 0, key, self.out_velocity),
            PianoLayout::key_binding(key),
            DetectorMode::Bounds,
        )
    }

    pub fn create_falling_note(&self, info: NoteInfo, duration_s: f64) -> Entity {
        let colour = track_rgba(info.track.unwrap_or(0));
        let fill = if PianoLayout::is_black_key(info.key) {
            darken_rgba(colour, DARKEN_MULTIPLIER)
        } else {
            colour
        };
        falling_note(
            self.layout.x_position(info.key),
            self.layout.key_width(info.key),
            fill,
            info,
            duration_s,
            self.note_speed,
            DetectorMode::Bounds,
        )
    }

    /// A brief flash rising from the keyboard above the played note.
    pub fn create_note_play_effect(&self, source: &Entity) -> Entity {
        let fill = lighten_rgba(source.renderable().fill());
        let rect = RectShape::new(DVec2::new(source.size().x, EFFECT_HEIGHT), fill);
        Entity::new(
            Renderable::Rect(rect),
            DVec2::new(source.position().x, self.keyboard_y() - EFFECT_HEIGHT),
        )
        .with(Physics::new(0.0, -EFFECT_RISE_SPEED))
        .with(Lifetime::new(EFFECT_LIFETIME_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::Modifiers;
    use crate::game::capability::{CapabilityKind, InstrumentInputHandler};

    fn factory() -> PianoFactory {
        let config = Config {
            display_width: 1040,
            display_height: 800,
            ..Config::default()
        };
        PianoFactory::new(&config, 1.0)
    }

    #[test]
    fn row_has_whites_then_blacks() {
        let row = factory().create_instrument_row();
        assert_eq!(row.len(), 88);
        let keys: Vec<u8> = row
            .iter()
            .filter_map(|e| e.get::<NoteInfo>().map(|n| n.key))
            .collect();
        let first_black = keys
            .iter()
            .position(|&k| PianoLayout::is_black_key(k))
            .expect("black keys present");
        assert_eq!(first_black, 52);
        assert!(keys[first_black..].iter().all(|&k| PianoLayout::is_black_key(k)));
    }

    #[test]
    fn keys_sit_above_the_hover_gap() {
        let f = factory();
        let row = f.create_instrument_row();
        let expected = 800.0 - WHITE_KEY_HEIGHT - 800.0 * KEY_HOVER_PERCENTAGE;
        assert!(row.iter().all(|e| e.position().y == expected));
        assert_eq!(f.keyboard_y(), expected);
    }

    #[test]
    fn instrument_keys_carry_their_bindings() {
        let row = factory().create_instrument_row();
        let c_sharp = row
            .iter()
            .find(|e| e.get::<NoteInfo>().is_some_and(|n| n.key == 61))
            .expect("C#4 exists");
        let binding = c_sharp
            .get::<InstrumentInputHandler>()
            .map(InstrumentInputHandler::binding)
            .expect("input handler");
        assert_eq!(binding, PianoLayout::key_binding(61));
        assert_eq!(binding.modifiers, Modifiers::SHIFT);
        assert!(c_sharp.has(CapabilityKind::Instrument));
        assert!(!c_sharp.has(CapabilityKind::Collidable), "keys start released");
    }

    #[test]
    fn black_notes_are_narrow_and_darker() {
        let f = factory();
        let white = f.create_falling_note(NoteInfo::new(Some(1), 0, 60, 90), 1.0);
        let black = f.create_falling_note(NoteInfo::new(Some(1), 0, 61, 90), 1.0);
        assert_eq!(white.size().x, 20.0);
        assert_eq!(black.size().x, 12.0);
        assert_eq!(white.renderable().fill(), track_rgba(1));
        assert_eq!(
            black.renderable().fill(),
            darken_rgba(track_rgba(1), DARKEN_MULTIPLIER)
        );
    }

    #[test]
    fn play_effect_rises_then_expires() {
        let f = factory();
        let note = f.create_falling_note(NoteInfo::new(Some(0), 0, 60, 90), 1.0);
        let effect = f.create_note_play_effect(&note);
        assert_eq!(effect.position().x, note.position().x);
        assert!(effect.get::<Physics>().is_some_and(|p| p.velocity.y < 0.0));
        assert!(effect.has(CapabilityKind::Lifetime));
    }
}
