//! Instrumented unit for exercising entity bookkeeping in tests.

use std::cell::Cell;
use std::rc::Rc;

use crate::game::capability::{Capability, CapabilityKind};
use crate::game::entity::Entity;

#[derive(Debug, Default)]
pub struct ProbeStats {
    pub updates: Cell<u32>,
    pub drops: Cell<u32>,
    /// Drop count observed during the most recent update.
    pub drops_seen: Cell<Option<u32>>,
    /// Whether the entity reported the probe's own kind as present at the
    /// end of its most recent update.
    pub own_kind_seen: Cell<Option<bool>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeAction {
    Nothing,
    RemoveSelf,
    ReplaceSelf,
    Remove(CapabilityKind),
}

#[derive(Debug)]
pub struct Probe {
    kind: CapabilityKind,
    action: ProbeAction,
    stats: Rc<ProbeStats>,
}

impl Probe {
    pub fn new(kind: CapabilityKind, action: ProbeAction, stats: &Rc<ProbeStats>) -> Self {
        Self {
            kind,
            action,
            stats: Rc::clone(stats),
        }
    }

    pub const fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub(crate) fn update(&mut self, entity: &mut Entity) {
        let s = &self.stats;
        s.updates.set(s.updates.get() + 1);
        s.drops_seen.set(Some(s.drops.get()));
        match self.action {
            ProbeAction::Nothing => {}
            ProbeAction::RemoveSelf => entity.remove(self.kind),
            ProbeAction::ReplaceSelf => {
                entity.set(Self::new(self.kind, ProbeAction::Nothing, &self.stats));
            }
            ProbeAction::Remove(kind) => entity.remove(kind),
        }
        s.own_kind_seen.set(Some(entity.has(self.kind)));
    }
}

impl From<Probe> for Capability {
    fn from(p: Probe) -> Self {
        Self::Probe(p)
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.stats.drops.set(self.stats.drops.get() + 1);
    }
}
