// THEORY:
// The `Pixel` module is the smallest unit the controller reasons about. It is a
// "dumb" data container for one camera sample plus the single-pixel heuristics the
// vision passes need: an unweighted brightness estimate and the color key used to
// spot the goal marker. Anything that needs neighbors (smoothing, gradients) or
// history (motion) lives in the pass modules built on top of it.
//
// The camera hands us BGRA bytes, so construction from a byte slice follows that
// order. The fourth channel is carried along but never read by the heuristics.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = u16;

    /// Number of bytes per pixel in a camera buffer.
    pub const CHANNELS: usize = 4;

    /// A single camera sample.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        /// Padding channel of the BGRA layout, unused by the heuristics.
        pub alpha: Channel,
    }

    /// Color key for the goal marker: strongly red, weak green and blue.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GoalColorKey {
        pub red_min: Channel,
        pub green_max: Channel,
        pub blue_max: Channel,
    }

    impl Default for GoalColorKey {
        fn default() -> Self {
            Self {
                red_min: 150,
                green_max: 80,
                blue_max: 80,
            }
        }
    }

    impl Pixel {
        pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
        pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, 0)
        }

        pub const fn gray(level: Channel) -> Self {
            Pixel::rgb(level, level, level)
        }

        /// Reads one pixel from a BGRA byte quad.
        pub fn from_bgra(bytes: &[Byte]) -> Self {
            Pixel::new(bytes[2], bytes[1], bytes[0], bytes[3])
        }

        pub fn to_bgra(self) -> [Byte; CHANNELS] {
            [self.blue, self.green, self.red, self.alpha]
        }

        /// Unweighted mean of the three color channels, truncated.
        pub fn luminance(&self) -> Luminance {
            (self.red as Luminance + self.green as Luminance + self.blue as Luminance) / 3
        }

        pub fn matches_goal(&self, key: &GoalColorKey) -> bool {
            self.red > key.red_min && self.green < key.green_max && self.blue < key.blue_max
        }
    }
}
