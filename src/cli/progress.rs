//! CLI-specific progress handling for butterfly-rail
//!
//! Provides the progress bar shown while navigabilities are resolved.

use std::sync::Arc;

use butterfly_rail::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting resolved ports
pub fn create_progress_bar(total_ports: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_ports);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ports ({percent}%) ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    );
    pb
}

/// Progress manager for the navigability pass
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_ports: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_ports);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback feeding this bar, for `InferenceConfig::progress`.
    /// Called once per resolved port from the rayon workers.
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |_resolved: u64, _total: u64| pb.inc(1))
    }

    /// Close the bar once the run is over
    pub fn finish(&self) {
        self.pb.finish_with_message("✅ Navigabilities resolved");
    }
}
