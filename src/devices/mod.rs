// THEORY:
// The controller never talks to hardware or a simulator directly. Every device it
// needs is a small capability trait: something that captures frames, something that
// returns a raw proximity reading, something that accepts wheel velocities, a
// keyboard to poll and a stepper that advances time. The control loop is generic
// over these, so it runs the same against the simulator bindings, the PNG playback
// camera, or the scripted doubles used by the tests.

pub mod playback;
pub mod scripted;

use crate::core_modules::frame::Frame;

/// Distance reported when a reading is too weak to convert.
pub const OUT_OF_RANGE_CM: f64 = 99.9;
/// Readings below this are treated as "nothing in range".
pub const MIN_CONVERTIBLE_RAW: f64 = 10.0;
pub const MAX_REPORTED_CM: f64 = 20.0;

/// Converts a raw infrared proximity reading to centimeters.
///
/// The sensor response is roughly reciprocal in distance. Readings under 10 return
/// the 99.9 sentinel, close readings saturate at 20.0, and the result is rounded
/// to one decimal place with ties going to the even digit.
pub fn raw_to_cm(raw: f64) -> f64 {
    if raw < MIN_CONVERTIBLE_RAW {
        return OUT_OF_RANGE_CM;
    }
    let distance = (0.5 * (1000.0 / (raw + 1.0))).min(MAX_REPORTED_CM);
    (distance * 10.0).round_ties_even() / 10.0
}

/// Left/right wheel angular velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    pub left: f64,
    pub right: f64,
}

impl DriveCommand {
    pub const STOP: DriveCommand = DriveCommand::new(0.0, 0.0);

    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub const fn forward(speed: f64) -> Self {
        Self::new(speed, speed)
    }

    pub const fn reverse(speed: f64) -> Self {
        Self::new(-speed, -speed)
    }

    /// Turns in place clockwise (left wheel forward).
    pub const fn spin_right(speed: f64) -> Self {
        Self::new(speed, -speed)
    }

    pub const fn spin_left(speed: f64) -> Self {
        Self::new(-speed, speed)
    }
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ToggleManual,
    /// Held to toggle the stationary watch mode.
    Stay,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    pub const ARROW_LEFT: i32 = 314;
    pub const ARROW_UP: i32 = 315;
    pub const ARROW_RIGHT: i32 = 316;
    pub const ARROW_DOWN: i32 = 317;

    /// Maps a simulator key code (ASCII letters, 314-317 for arrows).
    pub fn from_code(code: i32) -> Option<Key> {
        match code {
            c if c == 'M' as i32 => Some(Key::ToggleManual),
            c if c == 'S' as i32 => Some(Key::Stay),
            Self::ARROW_UP => Some(Key::Up),
            Self::ARROW_DOWN => Some(Key::Down),
            Self::ARROW_LEFT => Some(Key::Left),
            Self::ARROW_RIGHT => Some(Key::Right),
            _ => None,
        }
    }
}

pub trait Camera {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Latest image, or `None` if the camera has not produced one yet.
    fn capture(&mut self) -> Option<Frame>;
}

pub trait ProximitySensor {
    fn raw_value(&mut self) -> f64;
}

pub trait DriveMotors {
    fn set_velocity(&mut self, command: DriveCommand);
}

pub trait Keyboard {
    /// Key held during this tick, if any.
    fn poll(&mut self) -> Option<Key>;
}

/// Advances simulated time by one control period.
pub trait Stepper {
    /// Returns `false` once the simulation has ended.
    fn step(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weak_readings_return_sentinel() {
        for raw in [-5.0, 0.0, 3.0, 9.0, 9.99] {
            assert_relative_eq!(raw_to_cm(raw), OUT_OF_RANGE_CM);
        }
    }

    #[test]
    fn close_readings_clamp_to_twenty() {
        for raw in [10.0, 15.0, 24.0] {
            assert_relative_eq!(raw_to_cm(raw), 20.0);
        }
        assert!(raw_to_cm(25.0) < 20.0);
    }

    #[test]
    fn converts_and_rounds_to_one_decimal() {
        assert_relative_eq!(raw_to_cm(65.0), 7.6);
        assert_relative_eq!(raw_to_cm(99.0), 5.0);
        assert_relative_eq!(raw_to_cm(499.0), 1.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 500 / 80 is exactly 6.25.
        assert_eq!(raw_to_cm(79.0), 6.2);
        assert_eq!(raw_to_cm(399.0), 1.2);
        assert_eq!(raw_to_cm(1999.0), 0.2);
        // 500 / 72 is 6.944..., not a tie.
        assert_eq!(raw_to_cm(71.0), 6.9);
    }

    #[test]
    fn distance_never_increases_with_raw() {
        let mut last = raw_to_cm(10.0);
        for step in 0..4000 {
            let next = raw_to_cm(10.0 + step as f64 * 0.5);
            assert!(next <= last, "raw_to_cm rose at step {step}");
            last = next;
        }
    }

    #[test]
    fn key_codes_map_to_keys() {
        assert_eq!(Key::from_code('M' as i32), Some(Key::ToggleManual));
        assert_eq!(Key::from_code('S' as i32), Some(Key::Stay));
        assert_eq!(Key::from_code(315), Some(Key::Up));
        assert_eq!(Key::from_code(314), Some(Key::Left));
        assert_eq!(Key::from_code('x' as i32), None);
    }
}
