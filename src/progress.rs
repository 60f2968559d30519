//! Progress bar for long-running bulk operations.
//!
//! A thin wrapper around `indicatif`, styled for counting completed files
//! rather than bytes.

use indicatif::{ProgressBar as Bar, ProgressStyle as Style};

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// A file-count progress bar, finished automatically on drop.
pub struct ProgressBar {
    bar: Bar,
}

impl ProgressBar {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = Bar::new(total);
        if let Ok(style) = Style::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(description.to_owned());
        Self { bar }
    }

    #[inline]
    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_with_message("done");
        }
    }
}
