use crate::config::Config;
use crate::game::capability::{DetectorMode, NoteInfo};
use crate::game::entity::Entity;
use crate::game::factory::falling_note;
use crate::game::layout::DefaultLayout;
use crate::ui::color::{BLACK, track_rgba};

pub const BACKGROUND_COLOUR: [f32; 4] = BLACK;

/// Falling notes only: one lane per MIDI key and no playable instrument.
#[derive(Clone, Debug)]
pub struct DefaultFactory {
    layout: DefaultLayout,
    note_speed: f64,
}

impl DefaultFactory {
    pub fn new(config: &Config, note_speed: f64) -> Self {
        Self {
            layout: DefaultLayout::new(config.screen_width()),
            note_speed,
        }
    }

    pub const fn note_speed(&self) -> f64 {
        self.note_speed
    }

    pub fn create_falling_note(&self, info: NoteInfo, duration_s: f64) -> Entity {
        falling_note(
            self.layout.x_position(info.key),
            self.layout.lane_width(),
            track_rgba(info.track.unwrap_or(0)),
            info,
            duration_s,
            self.note_speed,
            DetectorMode::Bounds,
        )
    }
}
