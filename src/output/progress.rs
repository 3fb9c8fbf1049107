use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_yellow};

/// Spinner for the two phases of a failed job scan.
///
/// Drawn on stderr only; hidden when stderr is not a terminal.
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_discovery(root: impl std::fmt::Display) -> Self {
        let pb = create_spinner(
            bright_yellow(format!("Phase 1/2: Discovering pipelines from {root}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_discovery_start_collection(self, pipeline_count: usize) -> Self {
        self.pb.finish_with_message(
            bright_green(format!("Phase 1/2: Discovered {pipeline_count} pipelines ✓"))
                .to_string(),
        );
        let pb = create_spinner(bright_yellow("Phase 2/2: Collecting failed jobs").to_string());
        Self { pb }
    }

    pub fn finish_collection(self, failed_count: usize) {
        self.pb.finish_with_message(
            bright_green(format!("Phase 2/2: Found {failed_count} failed jobs ✓")).to_string(),
        );
    }
}

// Abandons a phase that never finished, e.g. when the scan returns an error.
impl Drop for PhaseProgress {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.abandon();
        }
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
