use anyhow::Result;
use opencv::{highgui, prelude::*};

/// Key code that stops the loop.
pub const QUIT_KEY: i32 = 'q' as i32;

/// Renders frames to screen and reports user input.
pub trait DisplaySink {
    fn show(&mut self, frame: &Mat) -> Result<()>;
    /// Wait briefly for a keypress; `None` when no key was pressed.
    fn poll_key(&mut self) -> Result<Option<i32>>;
    fn close(&mut self) -> Result<()>;
}

/// OpenCV highgui window.
pub struct WindowDisplay {
    window_name: String,
    wait_ms: i32,
}

impl WindowDisplay {
    pub fn new(window_name: &str, wait_ms: i32) -> Result<Self> {
        highgui::named_window(window_name, highgui::WINDOW_AUTOSIZE)?;
        Ok(WindowDisplay {
            window_name: window_name.to_string(),
            wait_ms,
        })
    }
}

impl DisplaySink for WindowDisplay {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.window_name, frame)?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<i32>> {
        let key = highgui::wait_key(self.wait_ms)?;
        Ok((key >= 0).then_some(key))
    }

    fn close(&mut self) -> Result<()> {
        highgui::destroy_all_windows()?;
        Ok(())
    }
}
