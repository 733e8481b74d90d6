//! Motion state machine: legs, round trips and recovery.
//!
//! States: Idle with the Forward leg pending, Idle with the Backward leg
//! pending, Running. A start request is accepted only for the pending
//! direction and only while idle. Completing a leg under
//! [`Behaviour::RoundTrip`] flips the pending direction; under
//! [`Behaviour::OneWay`] the Forward leg is pending afterwards, so a reverse
//! leg still owed from an earlier round trip settles the filter back home.
//!
//! Every operation takes the host's [`TargetResolver`]. The machine holds a
//! target reference (via `acquire`) only while a leg runs, and releases it on
//! every way out: completion, abort, recover and teardown.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::binding::{resolve_target, TargetHandle, TargetRef, TargetResolver};
use crate::config::{Behaviour, MotionConfig, Transform2D};
use crate::error::StartRejected;
use crate::outputs::{Change, MotionEvent, Outputs};
use crate::persist::{PersistedOrigin, PersistedState};
use crate::snapshot::{TargetReading, VariationSnapshot};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Running,
}

/// Where the target was when the last forward leg began. Backward legs return
/// here and `recover` writes it back.
#[derive(Clone, Debug, PartialEq)]
pub struct Origin {
    pub target: TargetRef,
    /// Handle seen at the last start; `None` after a restore from persisted state.
    pub handle: Option<TargetHandle>,
    pub transform: Transform2D,
}

/// One motion filter's run state. Created idle; lives as long as the filter.
#[derive(Debug, Default)]
pub struct MotionMachine {
    phase: Phase,
    /// Pending direction while idle, current leg's direction while running.
    direction: Direction,
    /// Behaviour captured when the running leg started.
    leg_behaviour: Behaviour,
    snapshot: Option<VariationSnapshot>,
    held: Option<TargetHandle>,
    origin: Option<Origin>,

    // Events raised outside tick(), delivered with the next tick's outputs.
    queued: Vec<MotionEvent>,
    outputs: Outputs,
}

impl MotionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Machine resuming from state persisted by a previous session.
    pub fn from_persisted(state: &PersistedState) -> Self {
        let direction = if state.reversed {
            Direction::Backward
        } else {
            Direction::Forward
        };
        let origin = state.origin.as_ref().map(|o| Origin {
            target: o.target.clone(),
            handle: None,
            transform: Transform2D {
                position: o.position,
                scale: o.scale,
            },
        });
        Self {
            direction,
            origin,
            ..Self::default()
        }
    }

    /// State the host should store so a reload resumes correctly.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            reversed: self.direction == Direction::Backward,
            origin: self.origin.as_ref().map(|o| PersistedOrigin {
                target: o.target.clone(),
                position: o.transform.position,
                scale: o.transform.scale,
            }),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Pending direction while idle; direction of the current leg while running.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Seconds accumulated by the current leg (0 while idle).
    pub fn elapsed(&self) -> f32 {
        match (&self.snapshot, self.phase) {
            (Some(s), Phase::Running) => s.elapsed,
            _ => 0.0,
        }
    }

    /// Snapshot of the current (or most recent) leg.
    pub fn snapshot(&self) -> Option<&VariationSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// Handle held by the running leg.
    pub fn held(&self) -> Option<TargetHandle> {
        self.held
    }

    /// Drain events queued since the last tick without ticking.
    pub fn take_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.queued)
    }

    /// Request a leg in `direction`. Returns whether it was accepted; rejected
    /// requests leave the machine untouched.
    pub fn request_start(
        &mut self,
        direction: Direction,
        config: &MotionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> bool {
        match self.try_start(direction, config, resolver) {
            Ok(()) => true,
            Err(reason) => {
                debug!("motion start rejected: {reason}");
                false
            }
        }
    }

    /// Like [`request_start`](Self::request_start), reporting why a request was rejected.
    pub fn try_start(
        &mut self,
        direction: Direction,
        config: &MotionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> Result<(), StartRejected> {
        if self.phase == Phase::Running {
            return Err(StartRejected::AlreadyRunning {
                running: self.direction,
            });
        }
        if direction != self.direction {
            return Err(StartRejected::DirectionNotPending {
                requested: direction,
                pending: self.direction,
            });
        }

        let config = config.sanitized();
        let unresolved = || StartRejected::TargetUnresolved {
            name: config.target.name.clone(),
        };
        let resolution = resolve_target(resolver, &config.target).ok_or_else(unresolved)?;
        let handle = resolution.handle;
        let live = resolver.transform(handle).ok_or_else(unresolved)?;
        let reading = TargetReading {
            live,
            native: resolver.native_size(handle),
        };

        let mut target = config.target.clone();
        if let Some(name) = &resolution.renamed {
            target.name = name.clone();
            self.queued
                .push(MotionEvent::TargetRenamed { name: name.clone() });
        }

        let origin = match direction {
            Direction::Forward => None,
            Direction::Backward => self.origin.as_ref().map(|o| o.transform),
        };
        let snapshot = VariationSnapshot::build(&config, direction, handle, reading, origin);

        match direction {
            Direction::Forward => {
                self.origin = Some(Origin {
                    target,
                    handle: Some(handle),
                    transform: snapshot.start(),
                });
            }
            Direction::Backward => {
                if let Some(origin) = self.origin.as_mut() {
                    origin.target = target;
                    origin.handle = Some(handle);
                }
            }
        }

        resolver.acquire(handle);
        self.held = Some(handle);
        self.snapshot = Some(snapshot);
        self.leg_behaviour = config.behaviour;
        self.phase = Phase::Running;
        self.queued.push(MotionEvent::LegStarted {
            direction,
            target: handle,
        });
        debug!(
            "motion {direction:?} leg started on {handle:?} ({:?}, {}s)",
            config.path_type, config.duration
        );
        Ok(())
    }

    /// Advance the running leg by one frame.
    ///
    /// The transform applied is the one for the elapsed time *before* this
    /// frame's `delta` is added; the leg ends on the frame that finds elapsed
    /// at or past the duration, after applying the final transform.
    pub fn tick(&mut self, delta: f32, resolver: &mut dyn TargetResolver) -> &Outputs {
        self.outputs.clear();

        if self.phase == Phase::Running {
            self.step(delta, resolver);
        }

        self.outputs.events.append(&mut self.queued);
        &self.outputs
    }

    fn step(&mut self, delta: f32, resolver: &mut dyn TargetResolver) {
        let Some(snapshot) = self.snapshot.as_mut() else {
            self.end_leg(resolver);
            return;
        };
        let handle = snapshot.target;

        if resolver.transform(handle).is_none() {
            let direction = self.direction;
            warn!("motion target {handle:?} vanished during the {direction:?} leg; aborting");
            self.end_leg(resolver);
            self.queued.push(MotionEvent::LegAborted { direction });
            return;
        }

        let percent = snapshot.percent();
        let transform = snapshot.sample_at(percent);
        resolver.set_transform(handle, transform);
        self.outputs.push_change(Change {
            target: handle,
            transform,
        });
        trace!(
            "motion tick: elapsed={} percent={percent} position=({}, {})",
            snapshot.elapsed,
            transform.position.x,
            transform.position.y
        );

        if snapshot.is_finished() {
            self.complete_leg(resolver);
        } else {
            snapshot.advance(delta);
        }
    }

    fn complete_leg(&mut self, resolver: &mut dyn TargetResolver) {
        let completed = self.direction;
        self.end_leg(resolver);
        self.direction = match self.leg_behaviour {
            Behaviour::RoundTrip => completed.flipped(),
            Behaviour::OneWay => Direction::Forward,
        };
        if self.direction != completed {
            let state = self.persisted_state();
            self.queued.push(MotionEvent::PersistRequested(state));
        }
        self.queued.push(MotionEvent::LegCompleted {
            direction: completed,
            pending: self.direction,
        });
        debug!(
            "motion {completed:?} leg completed; {:?} pending",
            self.direction
        );
    }

    /// Back to idle: release the held handle and reset elapsed time.
    fn end_leg(&mut self, resolver: &mut dyn TargetResolver) {
        if let Some(handle) = self.held.take() {
            resolver.release(handle);
        }
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.elapsed = 0.0;
        }
        self.phase = Phase::Idle;
    }

    /// Unwind: stop a running leg and put the target back at its origin, or,
    /// when idle with the reverse leg pending, restore the origin the round
    /// trip still owes. Afterwards the Forward leg is pending.
    ///
    /// Returns false (and does nothing) when idle with Forward pending.
    pub fn recover(&mut self, resolver: &mut dyn TargetResolver) -> bool {
        let running = self.phase == Phase::Running;
        if !running && self.direction == Direction::Forward {
            return false;
        }
        if running {
            self.end_leg(resolver);
        }

        if let Some(origin) = self.origin.clone() {
            match self.bind_origin(resolver, &origin) {
                Some(handle) => {
                    resolver.acquire(handle);
                    resolver.set_transform(handle, origin.transform);
                    resolver.release(handle);
                    self.queued.push(MotionEvent::Recovered { target: handle });
                    debug!("motion origin restored on {handle:?}");
                }
                None => debug!(
                    "motion origin target '{}' is gone; nothing to restore",
                    origin.target.name
                ),
            }
        }

        self.direction = Direction::Forward;
        let state = self.persisted_state();
        self.queued.push(MotionEvent::PersistRequested(state));
        true
    }

    /// Call before replacing the host's config `current` with `next`. Recovers
    /// first when the resolved target is about to change while a restore is
    /// owed (a leg is running or the reverse leg is pending). Returns whether
    /// it recovered.
    pub fn apply_config(
        &mut self,
        current: &MotionConfig,
        next: &MotionConfig,
        resolver: &mut dyn TargetResolver,
    ) -> bool {
        if self.phase == Phase::Idle && self.direction == Direction::Forward {
            return false;
        }

        // Restored machines may owe a reverse leg without knowing its origin;
        // the host's current target stands in for it.
        let (known, bound) = match (self.held, self.origin.clone()) {
            (Some(handle), origin) => (
                origin.map_or_else(|| current.target.clone(), |o| o.target),
                Some(handle),
            ),
            (None, Some(origin)) => {
                let bound = self.bind_origin(resolver, &origin);
                (origin.target, bound)
            }
            (None, None) => (
                current.target.clone(),
                resolve_target(resolver, &current.target).map(|r| r.handle),
            ),
        };
        let next_handle = resolve_target(resolver, &next.target).map(|r| r.handle);

        let changed = match (bound, next_handle) {
            (Some(a), Some(b)) => a != b,
            (None, None) => known.name != next.target.name,
            _ => true,
        };
        if changed {
            debug!(
                "motion target changing to '{}'; recovering first",
                next.target.name
            );
            self.recover(resolver)
        } else {
            false
        }
    }

    /// Abandon a running leg (the filter is being destroyed): release the
    /// handle without touching the target.
    pub fn teardown(&mut self, resolver: &mut dyn TargetResolver) {
        if self.phase == Phase::Running {
            debug!("motion {:?} leg abandoned on teardown", self.direction);
            self.end_leg(resolver);
        }
    }

    fn bind_origin(
        &self,
        resolver: &mut dyn TargetResolver,
        origin: &Origin,
    ) -> Option<TargetHandle> {
        if let Some(handle) = origin.handle {
            if resolver.transform(handle).is_some() {
                return Some(handle);
            }
        }
        resolve_target(resolver, &origin.target).map(|r| r.handle)
    }
}
