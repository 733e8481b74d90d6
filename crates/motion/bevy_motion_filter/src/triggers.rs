//! Named triggers (hotkeys, buttons, scripted cues) mapped to machine requests.

use bevy::prelude::*;
use std::collections::HashMap;

use motion_filter_core::{Behaviour, Direction, MotionError, StartRejected, TargetResolver};

use crate::components::MotionFilter;

pub const PLAY_FORWARD: &str = "play-forward";
pub const PLAY_BACKWARD: &str = "play-backward";
pub const GRAB_DESTINATION: &str = "grab-destination";

pub type TriggerHandler =
    fn(&mut MotionFilter, &mut dyn TargetResolver) -> Result<(), StartRejected>;

#[derive(Resource)]
pub struct TriggerTable {
    handlers: HashMap<String, TriggerHandler>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        let mut table = Self {
            handlers: HashMap::new(),
        };
        table.register(PLAY_FORWARD, play_forward);
        table.register(PLAY_BACKWARD, play_backward);
        table.register(GRAB_DESTINATION, grab_destination);
        table
    }
}

impl TriggerTable {
    /// Register (or replace) the handler for `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: TriggerHandler) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn handler(&self, name: &str) -> Result<TriggerHandler, MotionError> {
        self.handlers
            .get(name)
            .copied()
            .ok_or_else(|| MotionError::UnknownTrigger(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

// One-way filters only play forward from home; a reverse leg still owed by an
// earlier round trip goes through `play-backward`.
fn play_forward(
    filter: &mut MotionFilter,
    resolver: &mut dyn TargetResolver,
) -> Result<(), StartRejected> {
    if filter.config.behaviour == Behaviour::OneWay
        && filter.machine.direction() != Direction::Forward
    {
        return Err(StartRejected::Suppressed {
            requested: Direction::Forward,
        });
    }
    filter
        .machine
        .try_start(Direction::Forward, &filter.config, resolver)
}

fn play_backward(
    filter: &mut MotionFilter,
    resolver: &mut dyn TargetResolver,
) -> Result<(), StartRejected> {
    filter
        .machine
        .try_start(Direction::Backward, &filter.config, resolver)
}

fn grab_destination(
    filter: &mut MotionFilter,
    resolver: &mut dyn TargetResolver,
) -> Result<(), StartRejected> {
    if filter.config.grab_destination(resolver) {
        Ok(())
    } else {
        Err(StartRejected::TargetUnresolved {
            name: filter.config.target.name.clone(),
        })
    }
}
