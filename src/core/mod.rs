pub mod gfx;
pub mod input;
pub mod midi;
#[cfg(feature = "midi-device")]
pub mod midi_device;
