use winit::keyboard::KeyCode;

use crate::config::Config;
use crate::core::input::{KeyBinding, Modifiers, UiEvent};
use crate::game::capability::{CapabilityKind, Collidable, INVERT_MASK, InvertColour, MidiNote, NoteInfo};
use crate::game::entity::Entity;
use crate::game::tick::TickContext;

/// Turns key presses (keyboard, MIDI input or auto-play) into the pressed
/// state of an instrument key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstrumentInputHandler {
    binding: KeyBinding,
    held: Option<KeyCode>,
    key_down: bool,
    forced_active: bool,
}

impl InstrumentInputHandler {
    pub const fn new(binding: KeyBinding) -> Self {
        Self {
            binding,
            held: None,
            key_down: false,
            forced_active: false,
        }
    }

    pub const fn binding(&self) -> KeyBinding {
        self.binding
    }

    /// Keeps the key pressed regardless of physical input.
    pub fn set_active(&mut self, active: bool) {
        self.forced_active = active;
    }

    pub const fn is_active(&self) -> bool {
        self.key_down || self.forced_active
    }

    /// The physical key that plays `note` under `modifiers`. A configured
    /// override wins over the layout binding.
    fn trigger_key(&self, config: &Config, note: u8, modifiers: Modifiers) -> Option<KeyCode> {
        config
            .key_for_note(
                note,
                modifiers.contains(Modifiers::CTRL),
                modifiers.contains(Modifiers::SHIFT),
            )
            .or_else(|| (modifiers == self.binding.modifiers).then_some(self.binding.key))
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>, entity: &mut Entity) {
        let Some(note) = entity.get::<NoteInfo>().copied() else {
            return;
        };

        for event in ctx.ui_events {
            match *event {
                UiEvent::KeyPressed { key, modifiers } if self.held.is_none() => {
                    if self.trigger_key(ctx.config, note.key, modifiers) == Some(key) {
                        self.held = Some(key);
                        self.key_down = true;
                    }
                }
                UiEvent::KeyReleased { key, .. } if self.held == Some(key) => {
                    self.held = None;
                    self.key_down = false;
                }
                _ => {}
            }
        }

        for msg in ctx.midi_in.iter().filter(|m| m.is_note() && m.key == note.key) {
            self.key_down = msg.is_note_on();
        }

        let pressed = entity.has(CapabilityKind::Collidable);
        if self.is_active() && !pressed {
            entity.set(Collidable);
            entity.set(InvertColour::new(INVERT_MASK));
            entity.set(MidiNote::on(note.channel, note.key, ctx.config.midi_out_velocity));
        } else if !self.is_active() && pressed {
            entity.remove(CapabilityKind::Collidable);
            entity.set(InvertColour::new(INVERT_MASK));
            entity.set(MidiNote::off(note.channel, note.key));
        }
    }
}
