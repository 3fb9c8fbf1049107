mod progress;
pub mod report;
mod styling;
mod tables;

pub use progress::PhaseProgress;
pub use report::ReportFormat;
pub use styling::{dim, magenta_bold};

/// Prints the mrlens banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔍 mrlens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab merge request diagnostics")
    );
}
