use crate::config::GameMode;
use crate::core::gfx::Renderer;
use crate::game::capability::CapabilityKind;
use crate::game::entity::Entity;
use crate::game::tick::{Body, TickContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneId {
    Menu,
    Gameplay,
}

impl SceneId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Gameplay => "gameplay",
        }
    }
}

/// Raised by units during an update; applied by the game at the end of the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneRequest {
    Play(GameMode),
    Exit,
}

/// A flat list of entities. Draw order is list order.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new(id: SceneId, entities: Vec<Entity>) -> Self {
        Self { id, entities }
    }

    #[inline(always)]
    pub const fn id(&self) -> SceneId {
        self.id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn add(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of every entity for this tick's collision detection.
    pub fn bodies(&self) -> Vec<Body> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| Body::of(e, i))
            .collect()
    }

    /// Updates every entity in order, then appends whatever they spawned.
    pub fn update(&mut self, ctx: &mut TickContext<'_>, delta_ms: f64) {
        for (i, entity) in self.entities.iter_mut().enumerate() {
            ctx.set_current(i);
            entity.update(ctx, delta_ms);
        }
        self.entities.extend(ctx.take_spawned());
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for entity in &self.entities {
            entity.draw(renderer);
        }
    }

    /// Drops every entity that asked to be deleted. Returns how many went.
    pub fn clean_up(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !e.is_delete_requested());
        before - self.entities.len()
    }

    pub fn count_song_notes(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.has(CapabilityKind::SongNote))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::core::gfx::{NullRenderer, RectShape, Renderable};
    use crate::game::capability::{Lifetime, SongNote};
    use crate::game::tick::TestHarness;

    fn rect() -> Entity {
        Entity::new(
            Renderable::Rect(RectShape::new(DVec2::ONE, [1.0; 4])),
            DVec2::ZERO,
        )
    }

    #[test]
    fn deleted_entities_stay_until_clean_up() {
        let mut h = TestHarness::new();
        let mut scene = Scene::new(
            SceneId::Gameplay,
            vec![rect().with(SongNote), rect().with(Lifetime::new(1.0))],
        );

        scene.update(&mut h.ctx(), 1.0);
        assert_eq!(scene.len(), 2, "still present after the update");

        let mut renderer = NullRenderer::default();
        scene.draw(&mut renderer);
        renderer.present();
        assert_eq!(renderer.draws_last_frame, 2);

        assert_eq!(scene.clean_up(), 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.count_song_notes(), 1);
    }

    #[test]
    fn bodies_are_indexed_by_position() {
        let scene = Scene::new(SceneId::Menu, vec![rect(), rect().with(SongNote)]);
        let bodies = scene.bodies();
        assert_eq!(bodies[1].index, 1);
        assert!(bodies[1].song_note && !bodies[0].song_note);
    }
}
