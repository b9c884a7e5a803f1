//! Scripted learner for tests

use std::collections::VecDeque;

use super::{Learner, LearnerAction, SessionEvent};

/// Replays a fixed list of inputs, then quits
pub struct ScriptedLearner {
    inputs: VecDeque<String>,
    events: Vec<SessionEvent>,
}

impl ScriptedLearner {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }
}

impl Learner for ScriptedLearner {
    fn next_action(&mut self) -> std::io::Result<LearnerAction> {
        Ok(self
            .inputs
            .pop_front()
            .map(|input| LearnerAction::parse(&input))
            .unwrap_or(LearnerAction::Quit))
    }

    fn notify(&mut self, event: SessionEvent) {
        self.events.push(event);
    }
}
