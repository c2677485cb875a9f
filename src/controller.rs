// THEORY:
// The `Controller` is the per-tick loop that binds the devices to the behavior
// machine. One call to `tick` does, in order: read both front proximity sensors and
// keep the larger raw value, capture a frame into the `FrameStore`, poll the keyboard
// for mode keys, produce a drive command (from the keys in manual mode, from the
// state machine otherwise), send it to the motors, and finally rotate the frame
// store so this capture becomes next tick's "previous".
//
// Manual mode freezes the state machine: its state and dwell timer do not advance
// and pick up exactly where they left off when automatic mode resumes. Only the
// range reading keeps updating.

use crate::behavior::{BehaviorState, BehaviorStateMachine, TickOutcome};
use crate::core_modules::frame::FrameStore;
use crate::devices::{Camera, DriveCommand, DriveMotors, Key, Keyboard, ProximitySensor, Stepper};
use log::{info, warn};

/// Summary of one control tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub command: DriveCommand,
    pub manual: bool,
    pub state: BehaviorState,
    /// The automatic tick's outcome; `None` while in manual mode.
    pub outcome: Option<TickOutcome>,
}

pub struct Controller<C, S, M, K> {
    camera: C,
    front_sensors: [S; 2],
    motors: M,
    keyboard: K,
    machine: BehaviorStateMachine,
    frames: FrameStore,
    manual_mode: bool,
    stay_key_ticks: u32,
    last_key: Option<Key>,
}

impl<C, S, M, K> Controller<C, S, M, K>
where
    C: Camera,
    S: ProximitySensor,
    M: DriveMotors,
    K: Keyboard,
{
    pub fn new(
        camera: C,
        front_sensors: [S; 2],
        motors: M,
        keyboard: K,
        machine: BehaviorStateMachine,
    ) -> Self {
        info!(
            ">>> SYSTEM ONLINE. Resolution: {}x{}",
            camera.width(),
            camera.height()
        );
        info!(">>> PIPELINE: 3x3 smoothing -> gradient -> spatial filter");
        Self {
            camera,
            front_sensors,
            motors,
            keyboard,
            machine,
            frames: FrameStore::new(),
            manual_mode: false,
            stay_key_ticks: 0,
            last_key: None,
        }
    }

    /// Runs ticks until the stepper reports the end of the simulation.
    pub fn run(&mut self, stepper: &mut impl Stepper) -> u64 {
        let mut ticks = 0;
        while stepper.step() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    pub fn tick(&mut self) -> TickReport {
        let raw_distance = self
            .front_sensors
            .iter_mut()
            .map(|sensor| sensor.raw_value())
            .fold(f64::NEG_INFINITY, f64::max);

        if let Err(err) = self.frames.set_current(self.camera.capture()) {
            warn!("Discarding previous frame: {err}");
        }

        let key = self.keyboard.poll();
        self.handle_mode_keys(key);

        let (command, outcome) = if self.manual_mode {
            self.machine.observe_distance(raw_distance);
            (self.manual_command(key), None)
        } else {
            let outcome = self.machine.tick(raw_distance, &self.frames);
            (outcome.command, Some(outcome))
        };

        self.motors.set_velocity(command);
        self.frames.rotate();
        self.last_key = key;

        TickReport {
            command,
            manual: self.manual_mode,
            state: self.machine.state(),
            outcome,
        }
    }

    fn handle_mode_keys(&mut self, key: Option<Key>) {
        if key == Some(Key::ToggleManual) && self.last_key != Some(Key::ToggleManual) {
            self.manual_mode = !self.manual_mode;
            info!("Manual Mode: {}", self.manual_mode);
        }

        if key == Some(Key::Stay) {
            self.stay_key_ticks += 1;
            if self.stay_key_ticks == self.machine.config().stay_press_ticks {
                self.machine.toggle_stay();
            }
        } else {
            self.stay_key_ticks = 0;
        }
    }

    fn manual_command(&self, key: Option<Key>) -> DriveCommand {
        let speed = self.machine.config().cruise_speed;
        match key {
            Some(Key::Up) => DriveCommand::forward(speed),
            Some(Key::Down) => DriveCommand::reverse(speed),
            Some(Key::Left) => DriveCommand::spin_left(speed),
            Some(Key::Right) => DriveCommand::spin_right(speed),
            _ => DriveCommand::STOP,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.manual_mode
    }

    pub fn machine(&self) -> &BehaviorStateMachine {
        &self.machine
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn motors(&self) -> &M {
        &self.motors
    }
}
