// THEORY:
// `Frame` wraps one camera image exactly as the camera produces it: a row-major
// BGRA byte buffer of fixed width and height. It is immutable once built, and the
// only way in is through constructors that check the buffer against the declared
// dimensions, so every pass downstream can index without re-validating.
//
// `FrameStore` is the single owner of the current and previous frames. The control
// loop hands it a fresh capture at the start of a tick and calls `rotate` at the end,
// which retires the current frame to "previous". Motion analysis needs both, so
// until the second tick there is no pair and the pipeline reports `Waiting`.

use crate::core_modules::pixel::pixel::{Byte, CHANNELS, Pixel};
use image::RgbaImage;
use thiserror::Error;

/// Errors raised while building or exchanging frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Raw buffer does not hold `width * height` BGRA pixels.
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    /// A frame arrived with a different resolution than the one it follows.
    #[error("frame resolution changed from {expected:?} to {actual:?}")]
    ResolutionChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// A frame source had nothing to play back.
    #[error("no frames available")]
    NoFrames,

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An immutable BGRA camera image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<Byte>,
}

impl Frame {
    /// Wraps a raw BGRA buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<Byte>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a frame by evaluating `pixel_at(x, y)` for every position.
    pub fn from_fn<F>(width: u32, height: u32, mut pixel_at: F) -> Result<Self, FrameError>
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&pixel_at(x, y).to_bgra());
            }
        }
        Self::new(width, height, data)
    }

    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self, FrameError> {
        Self::from_fn(width, height, |_, _| pixel)
    }

    /// Converts an RGBA image (the `image` crate's native layout) into BGRA.
    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, FrameError> {
        let mut data = Vec::with_capacity(image.as_raw().len());
        for rgba in image.pixels() {
            let [r, g, b, a] = rgba.0;
            data.extend_from_slice(&[b, g, r, a]);
        }
        Self::new(image.width(), image.height(), data)
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut rgba = Vec::with_capacity(self.data.len());
        for bgra in self.data.chunks_exact(CHANNELS) {
            rgba.extend_from_slice(&[bgra[2], bgra[1], bgra[0], 255]);
        }
        // Length is guaranteed by construction.
        RgbaImage::from_raw(self.width, self.height, rgba)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[Byte] {
        &self.data
    }

    /// Returns the pixel at `(x, y)`. Callers keep coordinates inside the frame.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from_bgra(&self.data[i..i + CHANNELS])
    }
}

/// Owns the current and previous camera frames of the control loop.
#[derive(Debug, Default)]
pub struct FrameStore {
    current: Option<Frame>,
    previous: Option<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs this tick's capture.
    ///
    /// A frame whose resolution differs from the previous one is still stored, but
    /// the previous frame is dropped (it can no longer be compared) and the change
    /// is reported as an error.
    pub fn set_current(&mut self, frame: Option<Frame>) -> Result<(), FrameError> {
        let mismatch = match (&frame, &self.previous) {
            (Some(new), Some(old)) if new.dimensions() != old.dimensions() => {
                Some((old.dimensions(), new.dimensions()))
            }
            _ => None,
        };
        self.current = frame;
        if let Some((expected, actual)) = mismatch {
            self.previous = None;
            return Err(FrameError::ResolutionChanged { expected, actual });
        }
        Ok(())
    }

    /// End-of-tick promotion: current becomes previous.
    pub fn rotate(&mut self) {
        self.previous = self.current.take();
    }

    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Frame> {
        self.previous.as_ref()
    }

    pub fn has_pair(&self) -> bool {
        self.current.is_some() && self.previous.is_some()
    }
}
