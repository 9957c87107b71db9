use crate::game::capability::{InstrumentInputHandler, NoteInfo};
use crate::game::entity::Entity;
use crate::game::tick::{Body, TickContext};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorMode {
    /// Full rectangle overlap.
    #[default]
    Bounds,
    /// Vertical overlap only. Drum lanes are matched by key, not by column.
    Vertical,
}

/// Collects the collidable entities overlapping its owner this tick.
/// Edges that merely touch count as overlapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionDetector {
    pub mode: DetectorMode,
    collisions: Vec<Body>,
}

impl CollisionDetector {
    pub const fn new(mode: DetectorMode) -> Self {
        Self {
            mode,
            collisions: Vec::new(),
        }
    }

    pub fn collisions(&self) -> &[Body] {
        &self.collisions
    }

    pub(crate) fn update(&mut self, ctx: &TickContext<'_>, entity: &Entity) {
        let me = Body::of(entity, ctx.current_index());
        let mode = self.mode;
        self.collisions.clear();
        self.collisions.extend(
            ctx.bodies
                .iter()
                .filter(|b| b.index != me.index && b.collidable)
                .filter(|b| match mode {
                    DetectorMode::Bounds => me.overlaps(b),
                    DetectorMode::Vertical => me.overlaps_vertically(b),
                })
                .copied(),
        );
    }
}

/// Lets a falling note be consumed by a pressed key of the same pitch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SongNoteCollisionHandler {
    in_contact: bool,
}

impl SongNoteCollisionHandler {
    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>, entity: &mut Entity) {
        let Some(key) = entity.get::<NoteInfo>().map(|n| n.key) else {
            return;
        };
        let key_top = entity.get::<CollisionDetector>().and_then(|d| {
            d.collisions()
                .iter()
                .filter(|b| b.instrument && b.key == Some(key))
                .map(|b| b.position.y)
                .reduce(f64::min)
        });
        let Some(key_top) = key_top else {
            self.in_contact = false;
            return;
        };

        if !self.in_contact {
            self.in_contact = true;
            let factory = ctx.factory;
            let effect = factory.create_note_play_effect(entity);
            ctx.spawn(effect);
        }

        let pos = entity.position();
        let size = entity.size();
        let remaining = key_top - pos.y;
        if remaining <= 0.0 {
            entity.request_delete();
        } else if remaining < size.y {
            entity.set_size(size.x, remaining);
        }
    }
}

/// Auto-play: holds a key down while a song note of its pitch touches it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstrumentCollisionHandler;

impl InstrumentCollisionHandler {
    pub(crate) fn update(&mut self, ctx: &TickContext<'_>, entity: &mut Entity) {
        if !ctx.config.auto_play {
            return;
        }
        let Some(key) = entity.get::<NoteInfo>().map(|n| n.key) else {
            return;
        };
        let touching = entity.get::<CollisionDetector>().is_some_and(|d| {
            d.collisions()
                .iter()
                .any(|b| b.song_note && b.key == Some(key))
        });
        if let Some(input) = entity.get_mut::<InstrumentInputHandler>() {
            input.set_active(touching);
        }
    }
}
