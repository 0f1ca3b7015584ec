use crate::ViewerError;
use crate::frame::Frame;
use crate::sink::FrameSink;
use minifb::{Key, Window, WindowOptions};

/// Convert HWC RGB buffer to packed ARGB u32 for minifb
fn rgb_to_argb(buf: &[u8], width: usize, height: usize) -> Vec<u32> {
    buf.chunks_exact(3)
        .take(width * height)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
        .collect()
}

/// Shows frames in a desktop window. The window opens on the first frame,
/// sized to it, and reopens when the frame size changes.
pub struct WindowSink {
    title: String,
    window: Option<Window>,
    width: usize,
    height: usize,
}

impl WindowSink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            width: 0,
            height: 0,
        }
    }

    fn window_for(&mut self, width: usize, height: usize) -> Result<&mut Window, ViewerError> {
        if self.window.is_none() || self.width != width || self.height != height {
            let mut window = Window::new(
                &format!("{} - ESC to exit", self.title),
                width,
                height,
                WindowOptions::default(),
            )
            .map_err(|e| ViewerError::Sink(e.to_string()))?;
            window.set_target_fps(30);
            log::debug!("opened {}x{} window", width, height);
            self.width = width;
            self.height = height;
            self.window = Some(window);
        }
        self.window
            .as_mut()
            .ok_or_else(|| ViewerError::Sink("window unavailable".to_string()))
    }
}

impl FrameSink for WindowSink {
    fn show(&mut self, frame: &Frame) -> Result<(), ViewerError> {
        if !self.is_open() {
            return Err(ViewerError::Sink("window closed".to_string()));
        }
        let rgb = image::load_from_memory_with_format(frame.data(), image::ImageFormat::Jpeg)
            .map_err(|e| ViewerError::Sink(format!("frame {}: {}", frame.seq(), e)))?
            .to_rgb8();
        let width = rgb.width() as usize;
        let height = rgb.height() as usize;
        let argb = rgb_to_argb(rgb.as_raw(), width, height);

        let window = self.window_for(width, height)?;
        window
            .update_with_buffer(&argb, width, height)
            .map_err(|e| ViewerError::Sink(e.to_string()))
    }

    fn clear(&mut self) -> Result<(), ViewerError> {
        if let Some(window) = self.window.as_mut() {
            let black = vec![0u32; self.width * self.height];
            window
                .update_with_buffer(&black, self.width, self.height)
                .map_err(|e| ViewerError::Sink(e.to_string()))?;
        }
        Ok(())
    }

    /// False once the user closed the window or pressed ESC.
    fn is_open(&self) -> bool {
        self.window
            .as_ref()
            .is_none_or(|w| w.is_open() && !w.is_key_down(Key::Escape))
    }
}
