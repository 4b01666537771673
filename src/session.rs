//! Host-side session: one [`Run`] plus its collaborators
//!
//! Owns the persistence handle, the event sinks and the player's settings.
//! Each frame ticks the run, fans events out to the sinks and applies any
//! checkpoints the run produced to the save data.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::audio::EventSink;
use crate::persistence::{Persistence, SaveData};
use crate::settings::Settings;
use crate::sim::{
    CharacterKind, Checkpoint, FieldBounds, GameEvent, GamePhase, RenderSnapshot, Run, TickInput,
    tick,
};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct Session {
    run: Run,
    settings: Settings,
    persistence: Box<dyn Persistence>,
    sinks: Vec<Box<dyn EventSink>>,
    save: SaveData,
    loaded: bool,
    clock: fn() -> u64,
    /// Leaderboard rank of the last finished run
    last_rank: Option<usize>,
}

impl Session {
    pub fn new(settings: Settings, persistence: Box<dyn Persistence>, field: FieldBounds) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut run = Run::new(seed, field);
        run.snapshot_interval = settings.snapshot_interval();
        run.muted = settings.muted;
        run.store
            .configure_effects(settings.max_particles(), settings.show_damage_numbers());
        Self {
            run,
            settings,
            persistence,
            sinks: Vec::new(),
            save: SaveData::default(),
            loaded: false,
            clock: unix_now,
            last_rank: None,
        }
    }

    /// Replace the wall clock used for high-score timestamps
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Read the save and open character select. Loads only once per session.
    pub fn start(&mut self) {
        if !self.loaded {
            self.save = self.persistence.load();
            self.loaded = true;
            if self.save.recover_interrupted().is_some() {
                self.persistence.save(&self.save);
            }
            log::info!(
                "Save loaded: {} currency, {} runs",
                self.save.currency,
                self.save.lifetime.runs
            );
        }
        self.run.set_unlocked(&self.save.unlocked);
        self.run.open_character_select();
    }

    /// Select a character and start a run; false if it is locked
    pub fn begin(&mut self, character: CharacterKind) -> bool {
        if !self.loaded {
            self.start();
        }
        if !self.run.select_character(character) {
            return false;
        }
        self.run.begin();
        self.dispatch();
        true
    }

    /// Advance one frame
    pub fn frame(&mut self, input: &TickInput, dt: f32, field: FieldBounds) {
        tick(&mut self.run, input, dt, field);
        self.dispatch();
    }

    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        let chosen = self.run.choose_upgrade(index);
        self.dispatch();
        chosen
    }

    /// Quit the current run, recording it
    pub fn end_run(&mut self) {
        self.run.end_run();
        self.dispatch();
    }

    /// Spend saved currency on a character
    pub fn unlock_character(&mut self, character: CharacterKind) -> bool {
        if !self.save.unlock(character) {
            return false;
        }
        self.run.set_unlocked(&self.save.unlocked);
        self.persistence.save(&self.save);
        true
    }

    fn dispatch(&mut self) {
        for event in self.run.drain_events() {
            if let GameEvent::MuteToggled(muted) = event {
                self.settings.muted = muted;
            }
            for sink in &mut self.sinks {
                sink.notify(&event);
            }
        }

        let checkpoints = self.run.drain_checkpoints();
        if checkpoints.is_empty() {
            return;
        }
        for checkpoint in checkpoints {
            match checkpoint {
                Checkpoint::Snapshot(stats) => self.save.record_snapshot(&stats),
                Checkpoint::Finished { stats, outcome } => {
                    self.last_rank = self.save.finish_run(&stats, outcome, (self.clock)());
                    if let Some(rank) = self.last_rank {
                        log::info!("New high score #{rank}: {}", stats.score);
                    }
                }
            }
        }
        self.persistence.save(&self.save);
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut Run {
        &mut self.run
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.run)
    }
}
