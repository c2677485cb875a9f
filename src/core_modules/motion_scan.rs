// THEORY:
// Pass 1 of the vision pipeline. It walks a sparse grid (every `sample_stride`-th
// pixel on both axes) over the current and previous frames and answers three
// questions at once: how many samples changed brightness enough to count as motion,
// did the goal color appear anywhere, and where horizontally is the activity.
//
// The horizontal estimate is deliberately crude: the mean x of every contributing
// sample. A sample contributes when it moved, or once the goal color has been seen
// anywhere earlier in the scan (the goal flag is sticky for the rest of the frame).

use crate::core_modules::frame::Frame;
use crate::pipeline::PipelineConfig;

/// Output of the motion/color pass for one frame pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionScan {
    /// Number of sparse samples whose brightness changed past the sensitivity.
    pub moving_pixels: u32,
    /// Whether any sample matched the goal color key.
    pub is_goal: bool,
    /// Mean x of contributing samples, or `width / 2` if none contributed.
    pub blob_center_x: u32,
    /// Leftmost and rightmost contributing x, if any sample contributed.
    pub blob_extent: Option<(u32, u32)>,
}

pub fn scan(
    current: &Frame,
    previous: &Frame,
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> MotionScan {
    let stride = config.sample_stride.max(1);

    let mut moving_pixels = 0u32;
    let mut is_goal = false;
    let mut sum_x = 0u64;
    let mut contributors = 0u64;
    let mut min_x = width;
    let mut max_x = 0u32;

    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            let pixel = current.pixel(x, y);
            let delta = pixel.luminance().abs_diff(previous.pixel(x, y).luminance());

            let moving = delta > config.motion_sensitivity;
            if moving {
                moving_pixels += 1;
            }
            if pixel.matches_goal(&config.goal_color) {
                is_goal = true;
            }

            if moving || is_goal {
                sum_x += x as u64;
                contributors += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
    }

    let (blob_center_x, blob_extent) = if contributors > 0 {
        ((sum_x / contributors) as u32, Some((min_x, max_x)))
    } else {
        (width / 2, None)
    };

    MotionScan {
        moving_pixels,
        is_goal,
        blob_center_x,
        blob_extent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    const W: u32 = 64;
    const H: u32 = 32;

    fn run(current: &Frame, previous: &Frame) -> MotionScan {
        scan(current, previous, W, H, &PipelineConfig::default())
    }

    #[test]
    fn static_scene_centers_on_the_midpoint() {
        let frame = Frame::filled(W, H, Pixel::gray(90)).unwrap();
        let result = run(&frame, &frame);
        assert_eq!(result.moving_pixels, 0);
        assert!(!result.is_goal);
        assert_eq!(result.blob_center_x, W / 2);
        assert_eq!(result.blob_extent, None);
    }

    #[test]
    fn counts_only_strided_samples_above_sensitivity() {
        let previous = Frame::filled(W, H, Pixel::gray(100)).unwrap();
        // Exactly at the threshold does not count; one above does.
        let at_threshold = Frame::filled(W, H, Pixel::gray(140)).unwrap();
        let above = Frame::filled(W, H, Pixel::gray(141)).unwrap();

        assert_eq!(run(&at_threshold, &previous).moving_pixels, 0);
        assert_eq!(run(&above, &previous).moving_pixels, (W / 2) * (H / 2));
    }

    #[test]
    fn blob_center_follows_the_moving_region() {
        let previous = Frame::filled(W, H, Pixel::BLACK).unwrap();
        let current = Frame::from_fn(W, H, |x, _| {
            if (40..50).contains(&x) {
                Pixel::WHITE
            } else {
                Pixel::BLACK
            }
        })
        .unwrap();

        let result = run(&current, &previous);
        // Even columns 40..=48, all rows sampled every other line.
        assert_eq!(result.moving_pixels, 5 * (H / 2));
        assert_eq!(result.blob_center_x, 44);
        assert_eq!(result.blob_extent, Some((40, 48)));
    }

    #[test]
    fn goal_color_sets_flag_and_stays_set() {
        let frame = Frame::from_fn(W, H, |x, y| {
            if x == 10 && y == 0 {
                Pixel::rgb(220, 20, 20)
            } else {
                Pixel::gray(60)
            }
        })
        .unwrap();

        let result = run(&frame, &frame);
        assert!(result.is_goal);
        assert_eq!(result.moving_pixels, 0);
        // Everything from the goal sample onward contributes.
        assert_eq!(result.blob_extent, Some((0, W - 2)));
    }
}
