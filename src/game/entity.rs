use glam::DVec2;
use smallvec::SmallVec;

use crate::core::gfx::{Renderable, Renderer};
use crate::game::capability::{Capability, CapabilityKind, Phase, Unit};
use crate::game::tick::TickContext;

/// A drawable thing in a scene plus the capability units that give it
/// behaviour.
///
/// Units may add or remove units on their own entity while updating,
/// including their own kind. Displaced units are kept alive until the whole
/// update pass has finished.
#[derive(Debug)]
pub struct Entity {
    position: DVec2,
    /// Size at creation; text is resized by scaling relative to it.
    natural_size: DVec2,
    renderable: Renderable,
    slots: [Option<Capability>; CapabilityKind::COUNT],
    executing: Option<CapabilityKind>,
    /// The executing unit's kind was removed or replaced during its update.
    displaced: bool,
    delete_requested: bool,
    graveyard: SmallVec<[Capability; 2]>,
}

impl Entity {
    pub fn new(renderable: Renderable, position: DVec2) -> Self {
        let natural_size = match &renderable {
            Renderable::Rect(r) => r.size,
            Renderable::Text(t) => t.natural_size(),
        };
        Self {
            position,
            natural_size,
            renderable,
            slots: std::array::from_fn(|_| None),
            executing: None,
            displaced: false,
            delete_requested: false,
            graveyard: SmallVec::new(),
        }
    }

    /// Builder form of [`Entity::set`].
    pub fn with<T: Into<Capability>>(mut self, unit: T) -> Self {
        self.set(unit);
        self
    }

    #[inline(always)]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    #[inline(always)]
    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    pub fn size(&self) -> DVec2 {
        match &self.renderable {
            Renderable::Rect(r) => r.size,
            Renderable::Text(t) => self.natural_size * t.scale,
        }
    }

    /// Rectangles take the new size directly. Text is scaled against its
    /// natural size; a zero natural dimension scales to zero.
    pub fn set_size(&mut self, width: f64, height: f64) {
        match &mut self.renderable {
            Renderable::Rect(r) => r.size = DVec2::new(width, height),
            Renderable::Text(t) => {
                let ratio = |target: f64, natural: f64| {
                    if natural == 0.0 { 0.0 } else { target / natural }
                };
                t.scale = DVec2::new(
                    ratio(width, self.natural_size.x),
                    ratio(height, self.natural_size.y),
                );
            }
        }
    }

    #[inline(always)]
    pub const fn renderable(&self) -> &Renderable {
        &self.renderable
    }

    #[inline(always)]
    pub fn renderable_mut(&mut self) -> &mut Renderable {
        &mut self.renderable
    }

    /// Installs `unit` in its kind's slot, retiring any unit already there.
    pub fn set<T: Into<Capability>>(&mut self, unit: T) {
        let unit = unit.into();
        let kind = unit.kind();
        self.remove(kind);
        self.slots[kind.index()] = Some(unit);
    }

    /// Outside an update pass the unit is dropped at once.
    pub fn remove(&mut self, kind: CapabilityKind) {
        if let Some(old) = self.slots[kind.index()].take() {
            if self.executing.is_some() {
                self.graveyard.push(old);
            }
        } else if self.executing == Some(kind) {
            self.displaced = true;
        }
    }

    pub fn has(&self, kind: CapabilityKind) -> bool {
        self.slots[kind.index()].is_some() || (self.executing == Some(kind) && !self.displaced)
    }

    /// The unit of type `T`, if its kind's slot holds exactly that type.
    /// The currently executing unit is not reachable this way.
    pub fn get<T: Unit>(&self) -> Option<&T> {
        self.slots[T::KIND.index()].as_ref().and_then(T::peek)
    }

    pub fn get_mut<T: Unit>(&mut self) -> Option<&mut T> {
        self.slots[T::KIND.index()].as_mut().and_then(T::peek_mut)
    }

    pub fn unit_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[inline(always)]
    pub fn request_delete(&mut self) {
        self.delete_requested = true;
    }

    #[inline(always)]
    pub const fn is_delete_requested(&self) -> bool {
        self.delete_requested
    }

    /// Runs every unit once, detection kinds first, then the rest in kind
    /// order. An entity left without units asks to be deleted.
    pub fn update(&mut self, ctx: &mut TickContext<'_>, delta_ms: f64) {
        for phase in [Phase::Detect, Phase::Respond] {
            for kind in CapabilityKind::ALL {
                if kind.phase() != phase {
                    continue;
                }
                let Some(mut unit) = self.slots[kind.index()].take() else {
                    continue;
                };
                self.executing = Some(kind);
                self.displaced = false;
                unit.update(ctx, self, delta_ms);
                self.executing = None;
                if std::mem::take(&mut self.displaced) {
                    self.graveyard.push(unit);
                } else {
                    self.slots[kind.index()] = Some(unit);
                }
            }
        }

        if self.slots.iter().all(Option::is_none) {
            self.delete_requested = true;
        }
        self.graveyard.clear();
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.draw(self.position, &self.renderable);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::core::gfx::{RectShape, TextShape};
    use crate::game::capability::probe::{Probe, ProbeAction, ProbeStats};
    use crate::game::capability::{Label, NoteInfo, Physics};
    use crate::game::tick::TestHarness;
    use crate::ui::color::WHITE;

    fn blank() -> Entity {
        Entity::new(
            Renderable::Rect(RectShape::new(DVec2::new(10.0, 20.0), WHITE)),
            DVec2::new(1.0, 2.0),
        )
    }

    #[test]
    fn one_unit_per_kind() {
        let stats = Rc::new(ProbeStats::default());
        let mut e = blank()
            .with(Probe::new(CapabilityKind::Physics, ProbeAction::Nothing, &stats))
            .with(Physics::new(0.0, 1.0));
        assert_eq!(e.unit_count(), 1);
        assert!(e.get::<Physics>().is_some());
        assert_eq!(stats.drops.get(), 1, "replaced outside an update pass");
    }

    #[test]
    fn get_checks_the_concrete_type() {
        let stats = Rc::new(ProbeStats::default());
        let e = blank().with(Probe::new(CapabilityKind::NoteInfo, ProbeAction::Nothing, &stats));
        assert!(e.has(CapabilityKind::NoteInfo));
        assert!(e.get::<NoteInfo>().is_none());
    }

    #[test]
    fn self_replacement_is_destroyed_after_the_pass() {
        let mut h = TestHarness::new();
        let replaced = Rc::new(ProbeStats::default());
        let observer = Rc::new(ProbeStats::default());
        let mut e = blank()
            .with(Probe::new(CapabilityKind::Physics, ProbeAction::ReplaceSelf, &replaced))
            .with(Probe::new(CapabilityKind::Label, ProbeAction::Nothing, &observer));

        e.update(&mut h.ctx(), 1.0);

        assert_eq!(replaced.own_kind_seen.get(), Some(true));
        assert_eq!(replaced.drops.get(), 1, "old unit dropped once the pass ended");
        assert_eq!(replaced.updates.get(), 1, "replacement does not run this pass");
        assert!(e.has(CapabilityKind::Physics));
        assert_eq!(e.unit_count(), 2);
        assert!(!e.is_delete_requested());

        e.update(&mut h.ctx(), 1.0);
        assert_eq!(replaced.updates.get(), 2);
        assert_eq!(replaced.drops.get(), 1);
    }

    #[test]
    fn destroyed_units_outlive_the_rest_of_the_pass() {
        let mut h = TestHarness::new();
        let victim = Rc::new(ProbeStats::default());
        let killer = Rc::new(ProbeStats::default());
        let mut e = blank()
            .with(Probe::new(CapabilityKind::SongNote, ProbeAction::Nothing, &victim))
            .with(Probe::new(
                CapabilityKind::Physics,
                ProbeAction::Remove(CapabilityKind::SongNote),
                &killer,
            ))
            .with(Probe::new(CapabilityKind::Label, ProbeAction::Nothing, &victim));

        e.update(&mut h.ctx(), 1.0);

        // The Label probe ran after the removal and saw the victim alive.
        assert_eq!(victim.drops_seen.get(), Some(0));
        assert_eq!(victim.drops.get(), 1);
        assert_eq!(killer.updates.get(), 1);
        assert!(!e.has(CapabilityKind::SongNote));
    }

    #[test]
    fn self_removal_hides_the_kind_immediately() {
        let mut h = TestHarness::new();
        let stats = Rc::new(ProbeStats::default());
        let mut e = blank()
            .with(Probe::new(CapabilityKind::Lifetime, ProbeAction::RemoveSelf, &stats))
            .with(Label);

        e.update(&mut h.ctx(), 1.0);

        assert_eq!(stats.own_kind_seen.get(), Some(false));
        assert_eq!(stats.drops.get(), 1);
        assert!(!e.has(CapabilityKind::Lifetime));
        assert!(!e.is_delete_requested(), "label remains");
    }

    #[test]
    fn executing_unit_still_reports_its_kind() {
        let mut h = TestHarness::new();
        let stats = Rc::new(ProbeStats::default());
        let mut e = blank().with(Probe::new(CapabilityKind::Physics, ProbeAction::Nothing, &stats));
        e.update(&mut h.ctx(), 1.0);
        assert_eq!(stats.own_kind_seen.get(), Some(true));
    }

    #[test]
    fn detectors_run_before_lower_kinds() {
        let mut h = TestHarness::new();
        let early = Rc::new(ProbeStats::default());
        let detector = Rc::new(ProbeStats::default());
        let mut e = blank()
            .with(Probe::new(
                CapabilityKind::NoteInfo,
                ProbeAction::Nothing,
                &early,
            ))
            .with(Probe::new(
                CapabilityKind::CollisionDetector,
                ProbeAction::Remove(CapabilityKind::NoteInfo),
                &detector,
            ));
        e.update(&mut h.ctx(), 1.0);
        assert_eq!(early.updates.get(), 0, "removed by the detector first");
        assert_eq!(detector.updates.get(), 1);
    }

    #[test]
    fn entity_without_units_requests_deletion() {
        let mut h = TestHarness::new();
        let mut e = blank();
        assert!(!e.is_delete_requested());
        e.update(&mut h.ctx(), 1.0);
        assert!(e.is_delete_requested());
    }

    #[test]
    fn rect_size_round_trips_through_zero() {
        let mut e = blank();
        e.set_size(0.0, 0.0);
        assert_eq!(e.size(), DVec2::ZERO);
        e.set_size(5.0, 7.0);
        assert_eq!(e.size(), DVec2::new(5.0, 7.0));
    }

    #[test]
    fn text_resizes_by_scale() {
        let mut e = Entity::new(
            Renderable::Text(TextShape::new("abcd", 10, WHITE)),
            DVec2::ZERO,
        );
        let natural = e.size();
        e.set_size(natural.x * 2.0, natural.y * 0.5);
        assert_eq!(e.size(), DVec2::new(natural.x * 2.0, natural.y * 0.5));

        let mut empty = Entity::new(
            Renderable::Text(TextShape::new("", 10, WHITE)),
            DVec2::ZERO,
        );
        empty.set_size(10.0, 10.0);
        assert_eq!(empty.size().x, 0.0);
    }
}
