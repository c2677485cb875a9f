pub mod image_helper {
    use crate::core_modules::frame::{Frame, FrameError};
    use image::ImageEncoder;
    use std::path::Path;

    /// Writes a frame to disk as an RGBA PNG.
    pub fn save(path: impl AsRef<Path>, frame: &Frame) -> Result<(), FrameError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        let rgba = frame.to_rgba_image();

        encoder.write_image(
            rgba.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    /// Reads any image format the `image` crate understands into a frame.
    pub fn load(path: impl AsRef<Path>) -> Result<Frame, FrameError> {
        let rgba = image::open(path)?.to_rgba8();
        Frame::from_rgba_image(&rgba)
    }
}
