//! MIDI device adapters backed by `midir`.

use std::sync::mpsc;

use log::{info, warn};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::core::midi::{MidiInputSource, MidiMessage, MidiOutputSink};

const CLIENT_NAME: &str = "notefall";

/// Picks the first port whose name contains `hint` (any port when `hint` is empty).
fn pick_port<P>(ports: &[P], name_of: impl Fn(&P) -> Option<String>, hint: &str) -> Option<usize> {
    ports.iter().position(|p| {
        name_of(p).is_some_and(|name| hint.is_empty() || name.contains(hint))
    })
}

pub struct DeviceInput {
    _conn: MidiInputConnection<()>,
    rx: mpsc::Receiver<MidiMessage>,
}

impl DeviceInput {
    pub fn connect(port_hint: &str) -> Result<Self, String> {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| format!("MIDI input unavailable: {e}"))?;
        midi_in.ignore(Ignore::All);

        let ports = midi_in.ports();
        let idx = pick_port(&ports, |p| midi_in.port_name(p).ok(), port_hint)
            .ok_or_else(|| format!("No MIDI input port matching '{port_hint}'"))?;
        let port = &ports[idx];
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "<unknown>".to_string());

        let (tx, rx) = mpsc::channel();
        let conn = midi_in
            .connect(
                port,
                "notefall-in",
                move |_, bytes, _| {
                    if let Some(msg) = MidiMessage::from_bytes(bytes) {
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| format!("Failed to connect MIDI input '{port_name}': {e}"))?;
        info!("Listening for MIDI input from {port_name}");
        Ok(Self { _conn: conn, rx })
    }
}

impl MidiInputSource for DeviceInput {
    fn next_message(&mut self) -> Option<MidiMessage> {
        self.rx.try_recv().ok()
    }

    fn tick(&mut self) {}
}

pub struct DeviceOutput {
    conn: MidiOutputConnection,
}

impl DeviceOutput {
    pub fn connect(port_hint: &str) -> Result<Self, String> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| format!("MIDI output unavailable: {e}"))?;
        let ports = midi_out.ports();
        let idx = pick_port(&ports, |p| midi_out.port_name(p).ok(), port_hint)
            .ok_or_else(|| format!("No MIDI output port matching '{port_hint}'"))?;
        let port = &ports[idx];
        let port_name = midi_out
            .port_name(port)
            .unwrap_or_else(|_| "<unknown>".to_string());
        let conn = midi_out
            .connect(port, "notefall-out")
            .map_err(|e| format!("Failed to connect MIDI output '{port_name}': {e}"))?;
        info!("Sending MIDI output to {port_name}");
        Ok(Self { conn })
    }

    fn send(&mut self, bytes: &[u8]) {
        if let Err(e) = self.conn.send(bytes) {
            warn!("MIDI send failed: {e}");
        }
    }
}

impl MidiOutputSink for DeviceOutput {
    fn send_note_on(&mut self, key: u8, channel: u8, velocity: u8) {
        self.send(&[0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F]);
    }

    fn send_note_off(&mut self, key: u8, channel: u8) {
        self.send(&[0x80 | (channel & 0x0F), key & 0x7F, 0]);
    }
}
