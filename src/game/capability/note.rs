/// Identity of a note or instrument key. Live input and instrument keys have
/// no track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteInfo {
    pub track: Option<u16>,
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
}

impl NoteInfo {
    pub const fn new(track: Option<u16>, channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            track,
            channel,
            key,
            velocity,
        }
    }
}

/// Marks a falling note from the song.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SongNote;

/// Marks a playable key of the instrument row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instrument;

/// Present while an instrument key is pressed; collision detectors only
/// report entities carrying it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collidable;
