use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Status spinner shown while a search runs. Hidden when stderr is not a
/// terminal so piped output stays clean.
pub struct SearchSpinner {
    bar: ProgressBar,
}

impl SearchSpinner {
    pub fn start(message: String) -> Self {
        let bar = if is_terminal::is_terminal(&std::io::stderr()) {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
