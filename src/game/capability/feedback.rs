//! One-shot units that act on the tick they run and then remove themselves.

use crate::game::capability::CapabilityKind;
use crate::game::entity::Entity;
use crate::game::tick::TickContext;
use crate::ui::color::invert_rgba;

/// Byte mask applied to a key's fill when it is pressed or released.
pub const INVERT_MASK: u8 = 0xa0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvertColour {
    pub mask: u8,
}

impl InvertColour {
    pub const fn new(mask: u8) -> Self {
        Self { mask }
    }

    pub(crate) fn update(&mut self, entity: &mut Entity) {
        let fill = entity.renderable().fill();
        entity
            .renderable_mut()
            .set_fill(invert_rgba(fill, self.mask));
        entity.remove(CapabilityKind::InvertColour);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiNote {
    pub on: bool,
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
}

impl MidiNote {
    pub const fn on(channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            on: true,
            channel,
            key,
            velocity,
        }
    }

    pub const fn off(channel: u8, key: u8) -> Self {
        Self {
            on: false,
            channel,
            key,
            velocity: 0,
        }
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>, entity: &mut Entity) {
        let out = ctx.midi_out();
        if self.on {
            out.send_note_on(self.key, self.channel, self.velocity);
        } else {
            out.send_note_off(self.key, self.channel);
        }
        entity.remove(CapabilityKind::MidiNote);
    }
}
