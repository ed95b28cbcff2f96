//! Observer interface of the judgement engine.
//!
//! Consumers either implement [`EventSink`] directly or subscribe an
//! [`EventBus`] sink and drain its channel after each frame.

use crate::models::replay::Replay;
use crate::models::stats::HitJudgement;
use crate::shared::snapshot::GameState;
use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};

/// Receives engine notifications synchronously.
///
/// Every callback is invoked at most once per triggering event.
pub trait EventSink {
    /// After every frame advance.
    fn on_state_update(&mut self, _state: &GameState) {}

    /// Once per resolved object.
    fn on_judgement(&mut self, _judgement: &HitJudgement) {}

    /// Once, when HP first reaches 0.
    fn on_fail(&mut self) {}

    /// Once, when the run is over.
    fn on_game_end(&mut self, _state: &GameState, _replay: &Replay) {}
}

/// Owned form of every notification, as sent through the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StateUpdate(GameState),
    Judgement(HitJudgement),
    Fail,
    GameEnd { state: GameState, replay: Replay },
}

/// Channel pair carrying [`EngineEvent`]s out of the engine.
#[derive(Clone)]
pub struct EventBus {
    pub event_tx: Sender<EngineEvent>,
    pub event_rx: Receiver<EngineEvent>,
}

impl EventBus {
    /// Creates a new bus with an unbounded channel.
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self { event_tx, event_rx }
    }

    /// A sink that forwards into this bus.
    pub fn sink(&self) -> ChannelSink {
        ChannelSink {
            tx: self.event_tx.clone(),
        }
    }

    /// Drains the events currently queued.
    pub fn try_iter(&self) -> TryIter<'_, EngineEvent> {
        self.event_rx.try_iter()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// [`EventSink`] that sends every notification through a channel.
pub struct ChannelSink {
    tx: Sender<EngineEvent>,
}

impl ChannelSink {
    fn send(&self, event: EngineEvent) {
        if let Err(e) = self.tx.send(event) {
            log::warn!("ENGINE: Event receiver dropped: {}", e);
        }
    }
}

impl EventSink for ChannelSink {
    fn on_state_update(&mut self, state: &GameState) {
        self.send(EngineEvent::StateUpdate(state.clone()));
    }

    fn on_judgement(&mut self, judgement: &HitJudgement) {
        self.send(EngineEvent::Judgement(judgement.clone()));
    }

    fn on_fail(&mut self) {
        self.send(EngineEvent::Fail);
    }

    fn on_game_end(&mut self, state: &GameState, replay: &Replay) {
        self.send(EngineEvent::GameEnd {
            state: state.clone(),
            replay: replay.clone(),
        });
    }
}
