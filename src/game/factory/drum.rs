use glam::DVec2;

use crate::config::Config;
use crate::core::gfx::RectShape;
use crate::core::midi::DRUM_CHANNEL;
use crate::game::capability::{DetectorMode, NoteInfo};
use crate::game::entity::Entity;
use crate::game::factory::{falling_note, instrument_key};
use crate::game::layout::DrumLayout;
use crate::ui::color::{BLACK, RED, WHITE};

pub const BACKGROUND_COLOUR: [f32; 4] = BLACK;
pub const INSTRUMENT_HEIGHT: f64 = 60.0;
pub const INSTRUMENT_HOVER_PERCENTAGE: f64 = 0.05;

#[derive(Clone, Debug)]
pub struct DrumFactory {
    layout: DrumLayout,
    note_speed: f64,
    screen_height: f64,
    out_velocity: u8,
}

impl DrumFactory {
    pub fn new(config: &Config, note_speed: f64, lanes: &[u8]) -> Self {
        let layout = DrumLayout::new(config.screen_width(), lanes);
        log::info!("Drum kit has {} lanes", layout.lanes().len());
        Self {
            layout,
            note_speed,
            screen_height: config.screen_height(),
            out_velocity: config.midi_out_velocity,
        }
    }

    pub const fn note_speed(&self) -> f64 {
        self.note_speed
    }

    pub const fn layout(&self) -> &DrumLayout {
        &self.layout
    }

    pub fn instrument_y(&self) -> f64 {
        self.screen_height - INSTRUMENT_HEIGHT - self.screen_height * INSTRUMENT_HOVER_PERCENTAGE
    }

    pub fn create_instrument_row(&self) -> Vec<Entity> {
        let size = DVec2::new(self.layout.lane_width(), INSTRUMENT_HEIGHT);
        self.layout
            .lanes()
            .iter()
            .map(|&key| {
                instrument_key(
                    DVec2::new(self.layout.x_position(key), self.instrument_y()),
                    RectShape::new(size, RED),
                    NoteInfo::new(None, DRUM_CHANNEL, key, self.out_velocity),
                    self.layout.key_binding(key),
                    DetectorMode::Vertical,
                )
            })
            .collect()
    }

    pub fn create_falling_note(&self, info: NoteInfo, duration_s: f64) -> Entity {
        falling_note(
            self.layout.x_position(info.key),
            self.layout.lane_width(),
            WHITE,
            info,
            duration_s,
            self.note_speed,
            DetectorMode::Vertical,
        )
    }
}
