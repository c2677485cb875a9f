//! Deterministic in-process devices.
//!
//! Each device advances its own tick counter once per read, which matches the
//! control loop reading every device exactly once per tick.

use super::{Camera, DriveCommand, DriveMotors, Key, Keyboard, ProximitySensor, Stepper};
use crate::core_modules::frame::Frame;
use std::collections::VecDeque;

/// Camera that produces `render(tick)` on every capture.
pub struct ScriptedCamera<F> {
    width: u32,
    height: u32,
    tick: u64,
    render: F,
}

impl<F> ScriptedCamera<F>
where
    F: FnMut(u64) -> Option<Frame>,
{
    pub fn new(width: u32, height: u32, render: F) -> Self {
        Self {
            width,
            height,
            tick: 0,
            render,
        }
    }
}

impl<F> Camera for ScriptedCamera<F>
where
    F: FnMut(u64) -> Option<Frame>,
{
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn capture(&mut self) -> Option<Frame> {
        let frame = (self.render)(self.tick);
        self.tick += 1;
        frame
    }
}

/// Proximity sensor whose reading is `reading(tick)`.
pub struct ScriptedProximity<F> {
    tick: u64,
    reading: F,
}

impl<F> ScriptedProximity<F>
where
    F: FnMut(u64) -> f64,
{
    pub fn new(reading: F) -> Self {
        Self { tick: 0, reading }
    }
}

impl<F> ProximitySensor for ScriptedProximity<F>
where
    F: FnMut(u64) -> f64,
{
    fn raw_value(&mut self) -> f64 {
        let value = (self.reading)(self.tick);
        self.tick += 1;
        value
    }
}

/// Keyboard replaying a queue of per-tick keys; silent once drained.
#[derive(Debug, Default)]
pub struct ScriptedKeyboard {
    keys: VecDeque<Option<Key>>,
}

impl ScriptedKeyboard {
    pub fn new(keys: impl IntoIterator<Item = Option<Key>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Builds the queue from raw simulator key codes; unmapped codes (including the
    /// simulator's `-1` for "no key") become silent ticks.
    pub fn from_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self::new(codes.into_iter().map(Key::from_code))
    }

    /// Appends `key` held for `ticks` consecutive ticks.
    pub fn hold(mut self, key: Option<Key>, ticks: usize) -> Self {
        self.keys.extend(std::iter::repeat_n(key, ticks));
        self
    }
}

impl Keyboard for ScriptedKeyboard {
    fn poll(&mut self) -> Option<Key> {
        self.keys.pop_front().flatten()
    }
}

/// Motors that keep every command they receive.
#[derive(Debug, Default)]
pub struct RecordingMotors {
    pub commands: Vec<DriveCommand>,
}

impl DriveMotors for RecordingMotors {
    fn set_velocity(&mut self, command: DriveCommand) {
        self.commands.push(command);
    }
}

/// Leg of the obstacle patrol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolLeg {
    Forward,
    Turn,
}

/// Open-loop driver for the moving obstacle robot: forward for `side_ticks`, turn in
/// place for `turn_ticks`, repeat. It has no sensors; the observer's `DYNAMIC` label
/// exists to catch it.
///
/// The leg counter is checked before it is incremented, so the very first forward
/// leg lasts one tick longer than the later ones.
#[derive(Debug, Clone)]
pub struct ObstaclePatrol {
    speed: f64,
    side_ticks: u32,
    turn_ticks: u32,
    leg: PatrolLeg,
    counter: u32,
}

impl Default for ObstaclePatrol {
    fn default() -> Self {
        Self::new(3.0, 100, 50)
    }
}

impl ObstaclePatrol {
    pub fn new(speed: f64, side_ticks: u32, turn_ticks: u32) -> Self {
        Self {
            speed,
            side_ticks,
            turn_ticks,
            leg: PatrolLeg::Forward,
            counter: 0,
        }
    }

    pub fn leg(&self) -> PatrolLeg {
        self.leg
    }

    /// Wheel command for this tick; advances the patrol by one tick.
    pub fn next_command(&mut self) -> DriveCommand {
        let (command, limit, next) = match self.leg {
            PatrolLeg::Forward => (
                DriveCommand::forward(self.speed),
                self.side_ticks,
                PatrolLeg::Turn,
            ),
            PatrolLeg::Turn => (
                DriveCommand::spin_left(self.speed),
                self.turn_ticks,
                PatrolLeg::Forward,
            ),
        };
        if self.counter >= limit {
            self.counter = 0;
            self.leg = next;
        }
        self.counter += 1;
        command
    }
}

/// Stepper that allows a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct FixedSteps {
    remaining: u64,
}

impl FixedSteps {
    pub fn new(steps: u64) -> Self {
        Self { remaining: steps }
    }
}

impl Stepper for FixedSteps {
    fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
