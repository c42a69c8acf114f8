//! Progress bars for long memory reads

use indicatif::{ProgressBar, ProgressStyle};
use ispdetect_core::bootloader::{BootRegion, ScanProgress};

/// Create a byte-counting progress bar
pub fn byte_bar(total: u64, phase: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                phase
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Boot block scan progress using an indicatif progress bar
pub struct IndicatifProgress {
    current_bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self { current_bar: None }
    }
}

impl ScanProgress for IndicatifProgress {
    fn scanning(&mut self, region: &BootRegion) {
        self.current_bar = Some(byte_bar(u64::from(region.len), "Scanning boot block"));
    }

    fn scan_progress(&mut self, bytes_read: u32) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(u64::from(bytes_read));
        }
    }

    fn complete(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }
}
