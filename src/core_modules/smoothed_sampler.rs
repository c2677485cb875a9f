// THEORY:
// The `SmoothedSampler` reads a pixel through a small blur so that sensor noise and
// one-pixel texture do not register as edges. The kernel is a cheap cross-shaped
// approximation of the 3x3 Gaussian: the center is weighted 4, the four orthogonal
// neighbors 1 each, diagonals are skipped, and the sum is divided by 8.
//
// Pixels on the outer ring have no complete neighborhood; for those the sampler
// returns the raw pixel unchanged. The vertical extent of that ring is normally the
// frame height, but it can be pinned to a fixed value to reproduce controllers that
// were tuned against a hardcoded 240-row camera.

pub mod smoothed_sampler {
    use crate::core_modules::frame::Frame;
    use crate::core_modules::pixel::pixel::{Channel, Luminance, Pixel};

    const CENTER_WEIGHT: u16 = 4;
    const KERNEL_DIVISOR: u16 = 8;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct SmoothedSampler {
        /// Row count used for the border check in place of the frame height.
        vertical_bound: Option<u32>,
    }

    impl SmoothedSampler {
        pub fn new(vertical_bound: Option<u32>) -> Self {
            Self { vertical_bound }
        }

        /// Samples `(x, y)` through the cross kernel, or raw on the border ring.
        pub fn sample(&self, frame: &Frame, x: u32, y: u32) -> Pixel {
            let width = frame.width();
            // A pinned bound larger than the real frame would read past the last row.
            let height = self
                .vertical_bound
                .map_or(frame.height(), |bound| bound.min(frame.height()));

            if x < 1 || x + 1 >= width || y < 1 || y + 1 >= height {
                return frame.pixel(x, y);
            }

            let center = frame.pixel(x, y);
            let up = frame.pixel(x, y - 1);
            let down = frame.pixel(x, y + 1);
            let left = frame.pixel(x - 1, y);
            let right = frame.pixel(x + 1, y);

            let blend = |pick: fn(&Pixel) -> Channel| -> Channel {
                let sum = CENTER_WEIGHT * pick(&center) as u16
                    + pick(&up) as u16
                    + pick(&down) as u16
                    + pick(&left) as u16
                    + pick(&right) as u16;
                (sum / KERNEL_DIVISOR) as Channel
            };

            Pixel::new(
                blend(|p: &Pixel| p.red),
                blend(|p: &Pixel| p.green),
                blend(|p: &Pixel| p.blue),
                center.alpha,
            )
        }

        pub fn luminance(&self, frame: &Frame, x: u32, y: u32) -> Luminance {
            self.sample(frame, x, y).luminance()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::smoothed_sampler::SmoothedSampler;
    use crate::core_modules::frame::Frame;
    use crate::core_modules::pixel::pixel::Pixel;

    fn single_bright_dot() -> Frame {
        Frame::from_fn(9, 9, |x, y| {
            if x == 4 && y == 4 {
                Pixel::rgb(200, 100, 40)
            } else {
                Pixel::BLACK
            }
        })
        .unwrap()
    }

    #[test]
    fn center_weight_is_half() {
        let frame = single_bright_dot();
        let sampled = SmoothedSampler::default().sample(&frame, 4, 4);
        assert_eq!(sampled, Pixel::rgb(100, 50, 20));
    }

    #[test]
    fn orthogonal_neighbor_gets_an_eighth_and_diagonal_nothing() {
        let frame = single_bright_dot();
        let sampler = SmoothedSampler::default();
        assert_eq!(sampler.sample(&frame, 5, 4), Pixel::rgb(25, 12, 5));
        assert_eq!(sampler.sample(&frame, 5, 5), Pixel::BLACK);
    }

    #[test]
    fn border_ring_returns_raw_pixel() {
        let frame = Frame::from_fn(6, 6, |x, _| if x == 1 { Pixel::WHITE } else { Pixel::BLACK })
            .unwrap();
        let sampler = SmoothedSampler::default();
        assert_eq!(sampler.sample(&frame, 0, 3), Pixel::BLACK);
        assert_eq!(sampler.sample(&frame, 1, 0), Pixel::WHITE);
        assert_eq!(sampler.sample(&frame, 1, 5), Pixel::WHITE);
        // Interior column next to the bright one is smoothed.
        assert_eq!(sampler.sample(&frame, 2, 3).red, 31);
    }

    #[test]
    fn pinned_vertical_bound_widens_the_raw_ring() {
        let frame = single_bright_dot();
        let pinned = SmoothedSampler::new(Some(5));
        // Row 4 is the last row inside a 5-row bound, so it is read raw.
        assert_eq!(pinned.sample(&frame, 4, 4), Pixel::rgb(200, 100, 40));
        assert_eq!(
            SmoothedSampler::new(Some(240)).sample(&frame, 4, 4),
            SmoothedSampler::default().sample(&frame, 4, 4)
        );
    }
}
