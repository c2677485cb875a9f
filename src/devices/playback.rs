//! Camera that replays a directory of still images.

use super::Camera;
use crate::core_modules::frame::{Frame, FrameError};
use crate::core_modules::utils::image_helper::image_helper;
use log::info;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Loops over pre-loaded frames in file-name order.
pub struct PlaybackCamera {
    frames: Vec<Frame>,
    cursor: usize,
}

impl PlaybackCamera {
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self, FrameError> {
        let first = frames.first().ok_or(FrameError::NoFrames)?;
        let expected = first.dimensions();
        if let Some(odd) = frames.iter().find(|f| f.dimensions() != expected) {
            return Err(FrameError::ResolutionChanged {
                expected,
                actual: odd.dimensions(),
            });
        }
        Ok(Self { frames, cursor: 0 })
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, FrameError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let frames = paths
            .iter()
            .map(|path| image_helper::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} frames from {}", frames.len(), dir.as_ref().display());
        Self::from_frames(frames)
    }
}

impl Camera for PlaybackCamera {
    fn width(&self) -> u32 {
        self.frames[0].width()
    }

    fn height(&self) -> u32 {
        self.frames[0].height()
    }

    fn capture(&mut self) -> Option<Frame> {
        let frame = self.frames.get(self.cursor).cloned();
        self.cursor = (self.cursor + 1) % self.frames.len();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn loops_over_frames() {
        let frames = vec![
            Frame::filled(4, 4, Pixel::BLACK).unwrap(),
            Frame::filled(4, 4, Pixel::WHITE).unwrap(),
        ];
        let mut camera = PlaybackCamera::from_frames(frames).unwrap();
        assert_eq!(camera.capture().unwrap().pixel(0, 0), Pixel::BLACK);
        assert_eq!(camera.capture().unwrap().pixel(0, 0), Pixel::WHITE);
        assert_eq!(camera.capture().unwrap().pixel(0, 0), Pixel::BLACK);
    }

    #[test]
    fn rejects_mixed_resolutions_and_empty_sets() {
        let frames = vec![
            Frame::filled(4, 4, Pixel::BLACK).unwrap(),
            Frame::filled(8, 4, Pixel::BLACK).unwrap(),
        ];
        assert!(matches!(
            PlaybackCamera::from_frames(frames),
            Err(FrameError::ResolutionChanged { .. })
        ));
        assert!(matches!(
            PlaybackCamera::from_frames(Vec::new()),
            Err(FrameError::NoFrames)
        ));
    }

    #[test]
    fn reads_images_from_a_directory() {
        let dir = std::env::temp_dir().join(format!("rover_vision_playback_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (i, level) in [10u8, 200].into_iter().enumerate() {
            let frame = Frame::filled(6, 3, Pixel::gray(level)).unwrap();
            image_helper::save(dir.join(format!("frame_{i:03}.png")), &frame).unwrap();
        }
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let mut camera = PlaybackCamera::from_dir(&dir).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!((camera.width(), camera.height()), (6, 3));
        assert_eq!(camera.capture().unwrap().pixel(0, 0).red, 10);
        assert_eq!(camera.capture().unwrap().pixel(0, 0).red, 200);
        // Only the two PNGs were loaded, so the third capture loops back.
        assert_eq!(camera.capture().unwrap().pixel(0, 0).red, 10);
    }
}
