use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// General MIDI percussion channel (0-based).
pub const DRUM_CHANNEL: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    Other,
}

/// A musical note event as produced by a MIDI file or a MIDI device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MidiMessage {
    pub kind: MessageKind,
    /// `None` for live input, which has no track.
    pub track: Option<u16>,
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
    /// Seconds until the matching note-off. Zero for live input.
    pub duration: f64,
}

impl MidiMessage {
    pub const fn note_on(track: u16, channel: u8, key: u8, velocity: u8, duration: f64) -> Self {
        Self {
            kind: MessageKind::NoteOn,
            track: Some(track),
            channel,
            key,
            velocity,
            duration,
        }
    }

    pub const fn note_off(track: u16, channel: u8, key: u8) -> Self {
        Self {
            kind: MessageKind::NoteOff,
            track: Some(track),
            channel,
            key,
            velocity: 0,
            duration: 0.0,
        }
    }

    /// Decodes a raw channel message. A note-on with zero velocity is a
    /// note-off, as in the MIDI running-status convention.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let [status, key, rest @ ..] = bytes else {
            return None;
        };
        let velocity = rest.first().copied().unwrap_or(0);
        let kind = match status & 0xF0 {
            0x90 if velocity > 0 => MessageKind::NoteOn,
            0x90 | 0x80 => MessageKind::NoteOff,
            0xA0..=0xE0 => MessageKind::Other,
            _ => return None,
        };
        Some(Self {
            kind,
            track: None,
            channel: status & 0x0F,
            key: key & 0x7F,
            velocity: velocity & 0x7F,
            duration: 0.0,
        })
    }

    #[inline(always)]
    pub const fn is_note(&self) -> bool {
        !matches!(self.kind, MessageKind::Other)
    }

    #[inline(always)]
    pub const fn is_note_on(&self) -> bool {
        matches!(self.kind, MessageKind::NoteOn)
    }
}

/// Timed note events from a song.
pub trait MidiFileSource {
    fn next_message(&mut self) -> Option<MidiMessage>;
    fn tick(&mut self, delta_ms: f64);
    fn is_end_of_stream(&self) -> bool;
    fn ticks_per_quarter_note(&self) -> u16;
    /// Distinct note-on keys in order of first appearance.
    fn unique_notes(&self) -> Vec<u8>;
}

/// Live note events from an instrument.
pub trait MidiInputSource {
    fn next_message(&mut self) -> Option<MidiMessage>;
    fn tick(&mut self);
}

pub trait MidiOutputSink {
    fn send_note_on(&mut self, key: u8, channel: u8, velocity: u8);
    fn send_note_off(&mut self, key: u8, channel: u8);
}

#[derive(Clone, Copy, Debug)]
struct ScheduledMessage {
    at_ms: f64,
    message: MidiMessage,
}

/// An in-memory song. Messages become available once the source clock has
/// reached their timestamp.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    ticks_per_quarter_note: u16,
    schedule: Vec<ScheduledMessage>,
    cursor: usize,
    now_ms: f64,
}

impl ScriptedSource {
    pub fn new(ticks_per_quarter_note: u16) -> Self {
        Self {
            ticks_per_quarter_note,
            schedule: Vec::new(),
            cursor: 0,
            now_ms: 0.0,
        }
    }

    /// Schedules a note-on at `at_ms` and its note-off `duration` seconds later.
    pub fn with_note(
        mut self,
        at_ms: f64,
        track: u16,
        channel: u8,
        key: u8,
        velocity: u8,
        duration: f64,
    ) -> Self {
        self.push(at_ms, MidiMessage::note_on(track, channel, key, velocity, duration));
        self.push(
            at_ms + duration * 1000.0,
            MidiMessage::note_off(track, channel, key),
        );
        self
    }

    pub fn push(&mut self, at_ms: f64, message: MidiMessage) {
        // Stable insert keeps arrival order for equal timestamps.
        let idx = self.schedule.partition_point(|s| s.at_ms <= at_ms);
        self.schedule
            .insert(idx.max(self.cursor), ScheduledMessage { at_ms, message });
    }
}

impl MidiFileSource for ScriptedSource {
    fn next_message(&mut self) -> Option<MidiMessage> {
        let next = self.schedule.get(self.cursor)?;
        if next.at_ms > self.now_ms {
            return None;
        }
        self.cursor += 1;
        Some(next.message)
    }

    fn tick(&mut self, delta_ms: f64) {
        self.now_ms += delta_ms;
    }

    fn is_end_of_stream(&self) -> bool {
        self.cursor >= self.schedule.len()
    }

    fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }

    fn unique_notes(&self) -> Vec<u8> {
        let mut seen = [false; 128];
        let mut out = Vec::new();
        for s in self.schedule.iter().filter(|s| s.message.is_note_on()) {
            let key = usize::from(s.message.key & 0x7F);
            if !seen[key] {
                seen[key] = true;
                out.push(s.message.key);
            }
        }
        out
    }
}

/// Loopback MIDI input. Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct MidiQueue(Rc<RefCell<VecDeque<MidiMessage>>>);

impl MidiQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: MidiMessage) {
        self.0.borrow_mut().push_back(message);
    }
}

impl MidiInputSource for MidiQueue {
    fn next_message(&mut self) -> Option<MidiMessage> {
        self.0.borrow_mut().pop_front()
    }

    fn tick(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentMessage {
    NoteOn { key: u8, channel: u8, velocity: u8 },
    NoteOff { key: u8, channel: u8 },
}

/// Output sink that records what was sent. Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct MidiLog(Rc<RefCell<Vec<SentMessage>>>);

impl MidiLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl MidiOutputSink for MidiLog {
    fn send_note_on(&mut self, key: u8, channel: u8, velocity: u8) {
        self.0.borrow_mut().push(SentMessage::NoteOn {
            key,
            channel,
            velocity,
        });
    }

    fn send_note_off(&mut self, key: u8, channel: u8) {
        self.0.borrow_mut().push(SentMessage::NoteOff { key, channel });
    }
}
