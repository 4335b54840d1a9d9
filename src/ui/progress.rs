//! Progress reporting

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};

/// Live console display for discovery and copy phases
pub struct ProgressReporter {
    /// Created by `start_scan`; retry has no discovery phase and never shows it
    scan_bar: Option<ProgressBar>,
    transfer_bar: ProgressBar,
    visible: bool,
    transfer_started_at: Option<Instant>,
    transferred_bytes: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing to stderr
    pub fn new() -> Self {
        let transfer_bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} files | {msg}")
        {
            transfer_bar.set_style(style.progress_chars("=>-"));
        }

        Self::with_bar(transfer_bar, true)
    }

    /// Reporter that draws nothing (`--quiet`, `--json`)
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), false)
    }

    fn with_bar(transfer_bar: ProgressBar, visible: bool) -> Self {
        Self {
            scan_bar: None,
            transfer_bar,
            visible,
            transfer_started_at: None,
            transferred_bytes: 0,
        }
    }

    /// Mark start of discovery.
    pub fn start_scan(&mut self, label: &str) {
        let scan_bar = if self.visible {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        scan_bar.set_message(format!("Scanning {}...", label));
        self.scan_bar = Some(scan_bar);
    }

    /// Update discovery counter.
    pub fn update_scan(&self, label: &str, files: u64) {
        if let Some(bar) = &self.scan_bar {
            bar.set_message(format!("Scanning {}... {} files", label, files));
        }
    }

    /// Mark completion of discovery.
    pub fn finish_scan(&self, label: &str, files: usize, skipped: usize) {
        if let Some(bar) = &self.scan_bar {
            bar.finish_with_message(format!(
                "Scanned {}: {} files ({} already copied)",
                label, files, skipped
            ));
        }
    }

    /// Initialize copy phase progress.
    pub fn start_transfer(&mut self, total_files: u64) {
        self.transfer_started_at = Some(Instant::now());
        self.transferred_bytes = 0;
        self.transfer_bar.set_length(total_files);
        self.transfer_bar.set_position(0);
        self.transfer_bar.set_message("Starting copy...".to_string());
    }

    /// Show the file currently being copied.
    pub fn set_current_file(&self, index: usize, total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.transfer_bar
            .set_message(format!("[{}/{}] {}", index, total, name));
    }

    /// Advance past a successful file.
    pub fn complete_file(&mut self, bytes: u64) {
        self.transferred_bytes = self.transferred_bytes.saturating_add(bytes);
        self.transfer_bar.inc(1);

        let throughput = self.current_throughput_bps();
        self.transfer_bar.set_message(format!(
            "{} copied | {}/s",
            HumanBytes(self.transferred_bytes),
            HumanBytes(throughput)
        ));
    }

    /// Advance past a failed file and print the failure above the bar.
    pub fn file_error(&self, path: &Path, err: &str) {
        self.transfer_bar.inc(1);
        self.transfer_bar
            .println(format!("FAILED {}: {}", path.display(), err));
    }

    /// Finalize copy phase.
    pub fn finish_transfer(&self, copied: usize, failed: usize) {
        let throughput = self.current_throughput_bps();
        self.transfer_bar.finish_with_message(format!(
            "{} copied, {} failed | {} total | {}/s",
            copied,
            failed,
            HumanBytes(self.transferred_bytes),
            HumanBytes(throughput)
        ));
    }

    fn current_throughput_bps(&self) -> u64 {
        match self.transfer_started_at {
            Some(started) => {
                let secs = started.elapsed().as_secs_f64();
                if secs > 0.0 {
                    (self.transferred_bytes as f64 / secs) as u64
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_transfer_progress_counts_successes_and_failures() {
        let mut reporter = ProgressReporter::new();
        reporter.start_transfer(3);

        reporter.complete_file(128);
        reporter.file_error(Path::new("/src/bad.txt"), "Not found");
        reporter.complete_file(256);

        assert_eq!(reporter.transfer_bar.position(), 3);
        assert_eq!(reporter.transfer_bar.length(), Some(3));
        assert_eq!(reporter.transferred_bytes, 384);
    }

    #[test]
    fn test_current_file_indicator_shows_index_and_name() {
        let reporter = ProgressReporter::new();
        reporter.set_current_file(2, 7, Path::new("/src/a/b/file.txt"));

        let msg = reporter.transfer_bar.message();
        assert!(msg.contains("[2/7]"));
        assert!(msg.contains("file.txt"));
    }

    #[test]
    fn test_throughput_becomes_non_zero_after_transfer_time() {
        let mut reporter = ProgressReporter::new();
        reporter.start_transfer(1);
        thread::sleep(Duration::from_millis(30));
        reporter.complete_file(1024);

        assert!(reporter.current_throughput_bps() > 0);
    }

    #[test]
    fn test_scan_spinner_only_exists_once_discovery_starts() {
        let mut reporter = ProgressReporter::new();
        reporter.start_transfer(1);
        assert!(reporter.scan_bar.is_none());

        reporter.start_scan("source");
        reporter.update_scan("source", 4);
        let bar = reporter.scan_bar.as_ref().expect("scan bar created");
        assert!(bar.message().contains("4 files"));

        reporter.finish_scan("source", 4, 0);
        assert!(reporter.scan_bar.as_ref().expect("scan bar").is_finished());
    }

    #[test]
    fn test_hidden_reporter_still_tracks_state() {
        let mut reporter = ProgressReporter::hidden();
        reporter.start_scan("source");
        reporter.update_scan("source", 3);
        reporter.finish_scan("source", 3, 1);
        reporter.start_transfer(2);
        reporter.complete_file(10);
        reporter.finish_transfer(1, 0);
        assert_eq!(reporter.transferred_bytes, 10);
    }
}
