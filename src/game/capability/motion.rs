use glam::DVec2;

use crate::game::capability::{CapabilityKind, Unit};
use crate::game::entity::Entity;
use crate::game::tick::TickContext;

/// Constant velocity in pixels per millisecond.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Physics {
    pub velocity: DVec2,
}

impl Physics {
    pub const fn new(vx: f64, vy: f64) -> Self {
        Self {
            velocity: DVec2::new(vx, vy),
        }
    }

    pub(crate) fn update(&mut self, entity: &mut Entity, delta_ms: f64) {
        let pos = entity.position();
        entity.set_position(pos + self.velocity * delta_ms);
    }
}

/// Deletes its entity once the entity's top edge is below the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteOffscreen;

impl DeleteOffscreen {
    pub(crate) fn update(&mut self, ctx: &TickContext<'_>, entity: &mut Entity) {
        if entity.position().y > ctx.config.screen_height() {
            entity.request_delete();
        }
    }
}

/// Counts down and then freezes its entity in place by removing [`Physics`]
/// and itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifetime {
    pub remaining_ms: f64,
}

impl Lifetime {
    pub const fn new(remaining_ms: f64) -> Self {
        Self { remaining_ms }
    }

    pub(crate) fn update(&mut self, entity: &mut Entity, delta_ms: f64) {
        self.remaining_ms -= delta_ms;
        if self.remaining_ms <= 0.0 {
            entity.remove(Physics::KIND);
            entity.remove(CapabilityKind::Lifetime);
        }
    }
}
