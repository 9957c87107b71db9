//! Capability units: single-kind behaviours attached to an [`Entity`].
//!
//! The set of kinds is closed. An entity holds at most one unit per kind;
//! several unit types may share a kind (both collision handlers are
//! `CollisionHandler`), in which case installing one replaces the other.

pub mod collision;
pub mod feedback;
pub mod input;
pub mod menu;
pub mod motion;
pub mod note;
#[cfg(test)]
pub mod probe;

use crate::game::entity::Entity;
use crate::game::tick::TickContext;

pub use collision::{
    CollisionDetector, DetectorMode, InstrumentCollisionHandler, SongNoteCollisionHandler,
};
pub use feedback::{INVERT_MASK, InvertColour, MidiNote};
pub use input::InstrumentInputHandler;
pub use menu::{Label, MenuInputHandler, MenuItem};
pub use motion::{DeleteOffscreen, Lifetime, Physics};
pub use note::{Collidable, Instrument, NoteInfo, SongNote};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CapabilityKind {
    NoteInfo = 0,
    SongNote,
    Instrument,
    Collidable,
    Physics,
    DeleteOffscreen,
    Lifetime,
    CollisionDetector,
    CollisionHandler,
    InputHandler,
    InvertColour,
    MidiNote,
    MenuInput,
    MenuItem,
    Label,
}

/// Units of a `Detect` kind run before every `Respond` unit on the same
/// entity, so responders always see this tick's detection results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Detect,
    Respond,
}

impl CapabilityKind {
    pub const COUNT: usize = 15;

    pub const ALL: [Self; Self::COUNT] = [
        Self::NoteInfo,
        Self::SongNote,
        Self::Instrument,
        Self::Collidable,
        Self::Physics,
        Self::DeleteOffscreen,
        Self::Lifetime,
        Self::CollisionDetector,
        Self::CollisionHandler,
        Self::InputHandler,
        Self::InvertColour,
        Self::MidiNote,
        Self::MenuInput,
        Self::MenuItem,
        Self::Label,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn phase(self) -> Phase {
        match self {
            Self::CollisionDetector => Phase::Detect,
            _ => Phase::Respond,
        }
    }
}

#[derive(Debug)]
pub enum Capability {
    NoteInfo(NoteInfo),
    SongNote(SongNote),
    Instrument(Instrument),
    Collidable(Collidable),
    Physics(Physics),
    DeleteOffscreen(DeleteOffscreen),
    Lifetime(Lifetime),
    CollisionDetector(CollisionDetector),
    SongNoteCollisionHandler(SongNoteCollisionHandler),
    InstrumentCollisionHandler(InstrumentCollisionHandler),
    InstrumentInputHandler(InstrumentInputHandler),
    InvertColour(InvertColour),
    MidiNote(MidiNote),
    MenuInputHandler(MenuInputHandler),
    MenuItem(MenuItem),
    Label(Label),
    #[cfg(test)]
    Probe(probe::Probe),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::NoteInfo(_) => CapabilityKind::NoteInfo,
            Self::SongNote(_) => CapabilityKind::SongNote,
            Self::Instrument(_) => CapabilityKind::Instrument,
            Self::Collidable(_) => CapabilityKind::Collidable,
            Self::Physics(_) => CapabilityKind::Physics,
            Self::DeleteOffscreen(_) => CapabilityKind::DeleteOffscreen,
            Self::Lifetime(_) => CapabilityKind::Lifetime,
            Self::CollisionDetector(_) => CapabilityKind::CollisionDetector,
            Self::SongNoteCollisionHandler(_) | Self::InstrumentCollisionHandler(_) => {
                CapabilityKind::CollisionHandler
            }
            Self::InstrumentInputHandler(_) => CapabilityKind::InputHandler,
            Self::InvertColour(_) => CapabilityKind::InvertColour,
            Self::MidiNote(_) => CapabilityKind::MidiNote,
            Self::MenuInputHandler(_) => CapabilityKind::MenuInput,
            Self::MenuItem(_) => CapabilityKind::MenuItem,
            Self::Label(_) => CapabilityKind::Label,
            #[cfg(test)]
            Self::Probe(p) => p.kind(),
        }
    }

    /// Runs one tick of the unit. The unit has been lifted out of `entity`
    /// for the duration of the call and may freely add or remove units on it,
    /// including its own kind.
    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>, entity: &mut Entity, delta_ms: f64) {
        match self {
            Self::NoteInfo(_)
            | Self::SongNote(_)
            | Self::Instrument(_)
            | Self::Collidable(_)
            | Self::Label(_) => {}
            Self::Physics(u) => u.update(entity, delta_ms),
            Self::DeleteOffscreen(u) => u.update(ctx, entity),
            Self::Lifetime(u) => u.update(entity, delta_ms),
            Self::CollisionDetector(u) => u.update(ctx, entity),
            Self::SongNoteCollisionHandler(u) => u.update(ctx, entity),
            Self::InstrumentCollisionHandler(u) => u.update(ctx, entity),
            Self::InstrumentInputHandler(u) => u.update(ctx, entity),
            Self::InvertColour(u) => u.update(entity),
            Self::MidiNote(u) => u.update(ctx, entity),
            Self::MenuInputHandler(u) => u.update(ctx),
            Self::MenuItem(u) => u.update(ctx, entity),
            #[cfg(test)]
            Self::Probe(u) => u.update(entity),
        }
    }
}

/// Typed access to a unit stored in its kind's slot.
pub trait Unit: Into<Capability> {
    const KIND: CapabilityKind;

    fn peek(cap: &Capability) -> Option<&Self>;
    fn peek_mut(cap: &mut Capability) -> Option<&mut Self>;
}

macro_rules! unit {
    ($ty:ident => $kind:ident) => {
        impl From<$ty> for Capability {
            #[inline(always)]
            fn from(u: $ty) -> Self {
                Self::$ty(u)
            }
        }

        impl Unit for $ty {
            const KIND: CapabilityKind = CapabilityKind::$kind;

            #[inline(always)]
            fn peek(cap: &Capability) -> Option<&Self> {
                match cap {
                    Capability::$ty(u) => Some(u),
                    _ => None,
                }
            }

            #[inline(always)]
            fn peek_mut(cap: &mut Capability) -> Option<&mut Self> {
                match cap {
                    Capability::$ty(u) => Some(u),
                    _ => None,
                }
            }
        }
    };
}

unit!(NoteInfo => NoteInfo);
unit!(SongNote => SongNote);
unit!(Instrument => Instrument);
unit!(Collidable => Collidable);
unit!(Physics => Physics);
unit!(DeleteOffscreen => DeleteOffscreen);
unit!(Lifetime => Lifetime);
unit!(CollisionDetector => CollisionDetector);
unit!(SongNoteCollisionHandler => CollisionHandler);
unit!(InstrumentCollisionHandler => CollisionHandler);
unit!(InstrumentInputHandler => InputHandler);
unit!(InvertColour => InvertColour);
unit!(MidiNote => MidiNote);
unit!(MenuInputHandler => MenuInput);
unit!(MenuItem => MenuItem);
unit!(Label => Label);
