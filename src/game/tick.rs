use glam::DVec2;

use crate::config::Config;
use crate::core::input::UiEvent;
use crate::core::midi::{MidiMessage, MidiOutputSink};
use crate::game::capability::{CapabilityKind, NoteInfo};
use crate::game::entity::Entity;
use crate::game::factory::InstrumentFactory;
use crate::game::scene::SceneRequest;

/// Start-of-tick snapshot of an entity, as seen by collision detectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub index: usize,
    pub position: DVec2,
    pub size: DVec2,
    pub key: Option<u8>,
    pub song_note: bool,
    pub instrument: bool,
    pub collidable: bool,
}

impl Body {
    pub fn of(entity: &Entity, index: usize) -> Self {
        Self {
            index,
            position: entity.position(),
            size: entity.size(),
            key: entity.get::<NoteInfo>().map(|n| n.key),
            song_note: entity.has(CapabilityKind::SongNote),
            instrument: entity.has(CapabilityKind::Instrument),
            collidable: entity.has(CapabilityKind::Collidable),
        }
    }

    #[inline(always)]
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.y
    }

    #[inline(always)]
    pub fn right(&self) -> f64 {
        self.position.x + self.size.x
    }

    #[inline(always)]
    pub fn overlaps_vertically(&self, other: &Self) -> bool {
        self.position.y <= other.bottom() && other.position.y <= self.bottom()
    }

    #[inline(always)]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.position.x <= other.right()
            && other.position.x <= self.right()
            && self.overlaps_vertically(other)
    }
}

/// Menu focus published by the menu's input handler for its items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuCursor {
    pub focus: usize,
    /// Enter was pressed this tick.
    pub selected: bool,
}

/// Everything a unit may read or produce during one scene update.
pub struct TickContext<'a> {
    pub config: &'a Config,
    pub factory: &'a InstrumentFactory,
    /// MIDI input drained during the previous tick.
    pub midi_in: &'a [MidiMessage],
    /// Window events drained during the previous tick.
    pub ui_events: &'a [UiEvent],
    pub bodies: &'a [Body],
    midi_out: &'a mut dyn MidiOutputSink,
    current: usize,
    spawned: Vec<Entity>,
    scene_request: Option<SceneRequest>,
    menu_cursor: Option<MenuCursor>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        config: &'a Config,
        factory: &'a InstrumentFactory,
        midi_in: &'a [MidiMessage],
        ui_events: &'a [UiEvent],
        bodies: &'a [Body],
        midi_out: &'a mut dyn MidiOutputSink,
    ) -> Self {
        Self {
            config,
            factory,
            midi_in,
            ui_events,
            bodies,
            midi_out,
            current: usize::MAX,
            spawned: Vec::new(),
            scene_request: None,
            menu_cursor: None,
        }
    }

    pub fn midi_out(&mut self) -> &mut (dyn MidiOutputSink + 'a) {
        &mut *self.midi_out
    }

    /// Scene index of the entity being updated.
    #[inline(always)]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        self.current = index;
    }

    /// Queues an entity to join the scene once the update pass is over.
    pub fn spawn(&mut self, entity: Entity) {
        self.spawned.push(entity);
    }

    pub fn take_spawned(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.spawned)
    }

    /// Asks for a scene change at the end of the tick. A later request in
    /// the same tick replaces an earlier one.
    pub fn request_scene(&mut self, request: SceneRequest) {
        self.scene_request = Some(request);
    }

    pub fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.scene_request.take()
    }

    pub fn set_menu_cursor(&mut self, cursor: MenuCursor) {
        self.menu_cursor = Some(cursor);
    }

    /// `None` until a menu handler has run this tick.
    #[inline(always)]
    pub const fn menu_cursor(&self) -> Option<MenuCursor> {
        self.menu_cursor
    }
}

/// Owns everything a [`TickContext`] borrows, for driving units by hand.
#[cfg(test)]
pub(crate) struct TestHarness {
    pub config: Config,
    pub factory: InstrumentFactory,
    pub log: crate::core::midi::MidiLog,
    pub midi_in: Vec<MidiMessage>,
    pub ui_events: Vec<UiEvent>,
    pub bodies: Vec<Body>,
    sink: crate::core::midi::MidiLog,
}

#[cfg(test)]
impl TestHarness {
    pub fn new() -> Self {
        let config = Config::default();
        let factory =
            InstrumentFactory::for_mode(crate::config::GameMode::Default, &config, 1.0, &[]);
        let log = crate::core::midi::MidiLog::new();
        Self {
            config,
            factory,
            sink: log.clone(),
            log,
            midi_in: Vec::new(),
            ui_events: Vec::new(),
            bodies: Vec::new(),
        }
    }

    pub fn ctx(&mut self) -> TickContext<'_> {
        TickContext::new(
            &self.config,
            &self.factory,
            &self.midi_in,
            &self.ui_events,
            &self.bodies,
            &mut self.sink,
        )
    }
}
