use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::config::Config;
use crate::core::gfx::Renderer;
use crate::core::input::{UiEvent, UiEventSource};
use crate::core::midi::{MidiFileSource, MidiInputSource, MidiMessage, MidiOutputSink};
use crate::game::factory::{self, InstrumentFactory, menu};
use crate::game::scene::{Scene, SceneId, SceneRequest};
use crate::game::tick::TickContext;

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Source of per-tick elapsed time.
#[derive(Clone, Copy, Debug)]
pub enum FrameClock {
    Wall(Instant),
    /// Every tick lasts exactly this many milliseconds.
    Fixed(f64),
}

impl FrameClock {
    pub fn wall() -> Self {
        Self::Wall(Instant::now())
    }

    /// Milliseconds since the previous call.
    pub fn restart_ms(&mut self) -> f64 {
        match self {
            Self::Wall(last) => {
                let now = Instant::now();
                let elapsed = now.duration_since(*last);
                *last = now;
                elapsed.as_secs_f64() * 1000.0
            }
            Self::Fixed(step) => *step,
        }
    }
}

/// The collaborators a game talks to.
pub struct GameIo {
    pub midi_file: Box<dyn MidiFileSource>,
    pub midi_in: Box<dyn MidiInputSource>,
    pub midi_out: Box<dyn MidiOutputSink>,
    pub ui: Box<dyn UiEventSource>,
    pub renderer: Box<dyn Renderer>,
}

struct State {
    scene: Scene,
    factory: InstrumentFactory,
    note_speed: f64,
    song_notes: Vec<u8>,
    /// Live MIDI drained last tick.
    midi_in_buf: Vec<MidiMessage>,
    /// Window events drained last tick.
    ui_events: Vec<UiEvent>,
    running: bool,
    ticks: u64,
}

pub struct Game {
    config: Config,
    io: GameIo,
    clock: FrameClock,
    state: State,
}

impl Game {
    pub fn new(config: Config, io: GameIo, clock: FrameClock) -> Self {
        let note_speed = factory::note_speed(io.midi_file.ticks_per_quarter_note(), &config);
        let song_notes = io.midi_file.unique_notes();
        debug!("Song uses {} distinct keys: {:?}", song_notes.len(), song_notes);

        let factory =
            InstrumentFactory::for_mode(config.game_mode, &config, note_speed, &song_notes);
        let scene = if config.show_menu {
            Scene::new(
                SceneId::Menu,
                menu::create_menu(config.screen_width(), config.screen_height()),
            )
        } else {
            Scene::new(SceneId::Gameplay, factory.create_instrument_row())
        };
        info!("Starting in {} scene", scene.id().as_str());

        Self {
            config,
            io,
            clock,
            state: State {
                scene,
                factory,
                note_speed,
                song_notes,
                midi_in_buf: Vec::new(),
                ui_events: Vec::new(),
                running: true,
                ticks: 0,
            },
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub const fn factory(&self) -> &InstrumentFactory {
        &self.state.factory
    }

    pub const fn note_speed(&self) -> f64 {
        self.state.note_speed
    }

    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    pub const fn ticks(&self) -> u64 {
        self.state.ticks
    }

    /// Ticks until the song ends or the player quits, capped at `MaxFps`.
    pub fn run(&mut self) {
        let frame_budget = Duration::from_secs_f64(1.0 / f64::from(self.config.max_fps.max(1)));
        loop {
            let started = Instant::now();
            if self.tick() == Flow::Exit {
                break;
            }
            if let Some(rest) = frame_budget.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        info!("Session finished after {} ticks", self.state.ticks);
    }

    pub fn tick(&mut self) -> Flow {
        if !self.state.running {
            return Flow::Exit;
        }
        let Self {
            config,
            io,
            clock,
            state,
        } = self;

        io.renderer.clear(state.factory.background_colour());
        let delta_ms = clock.restart_ms();

        let bodies = state.scene.bodies();
        let scene_request = {
            let mut ctx = TickContext::new(
                config,
                &state.factory,
                &state.midi_in_buf,
                &state.ui_events,
                &bodies,
                io.midi_out.as_mut(),
            );
            state.scene.update(&mut ctx, delta_ms);
            ctx.take_scene_request()
        };
        state.scene.draw(io.renderer.as_mut());
        io.renderer.present();

        let gameplay = state.scene.id() == SceneId::Gameplay;
        if gameplay {
            state.spawn_song_notes(io.midi_file.as_mut());
        }

        state.midi_in_buf.clear();
        while let Some(msg) = io.midi_in.next_message() {
            if msg.is_note_on() {
                debug!("Live MIDI key {} pressed", msg.key);
            }
            state.midi_in_buf.push(msg);
        }

        state.ui_events.clear();
        while let Some(event) = io.ui.poll_event() {
            if event.is_exit_request() {
                info!("Exit requested");
                state.running = false;
            }
            state.ui_events.push(event);
        }

        if gameplay {
            io.midi_file.tick(delta_ms);
            io.midi_in.tick();
        }

        let removed = state.scene.clean_up();
        trace!(
            "tick {}: {:.3} ms, {} entities, {} removed",
            state.ticks,
            delta_ms,
            state.scene.len(),
            removed
        );
        if let Some(request) = scene_request {
            state.apply_scene_request(config, request);
        }

        if state.scene.id() == SceneId::Gameplay
            && io.midi_file.is_end_of_stream()
            && state.scene.count_song_notes() == 0
        {
            info!("Song finished");
            state.running = false;
        }

        state.ticks += 1;
        if state.running {
            Flow::Continue
        } else {
            Flow::Exit
        }
    }
}

impl State {
    fn spawn_song_notes(&mut self, midi_file: &mut dyn MidiFileSource) {
        while let Some(msg) = midi_file.next_message() {
            if !msg.is_note_on() {
                continue;
            }
            if !self.factory.maps_key(msg.key) {
                warn!(
                    "Skipping note {} outside the {} layout",
                    msg.key,
                    self.factory.mode().as_str()
                );
                continue;
            }
            debug!(
                "Spawning note {} (track {:?}, channel {}, {:.3}s)",
                msg.key, msg.track, msg.channel, msg.duration
            );
            let note = self.factory.create_falling_note(
                msg.track.unwrap_or(0),
                msg.channel,
                msg.key,
                msg.velocity,
                msg.duration,
            );
            self.scene.add(note);
        }
    }

    /// The outgoing scene and everything in it is dropped here.
    fn apply_scene_request(&mut self, config: &Config, request: SceneRequest) {
        match request {
            SceneRequest::Exit => {
                info!("Exit selected");
                self.running = false;
            }
            SceneRequest::Play(mode) => {
                if mode != self.factory.mode() {
                    self.factory =
                        InstrumentFactory::for_mode(mode, config, self.note_speed, &self.song_notes);
                }
                self.scene = Scene::new(SceneId::Gameplay, self.factory.create_instrument_row());
                info!("Entered gameplay ({})", mode.as_str());
            }
        }
    }
}
