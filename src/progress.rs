//! Spinner shown on stderr while the package manager runs

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Spinner for one install batch; hidden automatically when stderr is not a terminal
pub struct InstallSpinner {
    pb: ProgressBar,
}

impl InstallSpinner {
    pub fn start(packages: &[String]) -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(format!("Installing {}", truncate(&packages.join(" "), 60)));
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Clear the spinner after a successful install
    pub fn finish(self) {
        self.pb.finish_and_clear();
    }

    /// Leave the last message visible after a failed install
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
