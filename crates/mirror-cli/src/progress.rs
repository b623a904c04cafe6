use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

/// A progress bar that does nothing unless progress output is enabled.
pub struct Progress {
    bar: Option<ProgressBar>,
}

fn bar_template() -> &'static str {
    match ui::prefs().term_width {
        Some(cols) if cols >= 110 => "{prefix:.bold} {bar:40.cyan/blue} {pos}/{len} {msg}",
        Some(cols) if cols >= 80 => "{prefix:.bold} {wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{prefix:.bold} {wide_bar:.cyan/blue} {percent}%",
    }
}

impl Progress {
    #[must_use]
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    #[must_use]
    pub fn bar(total: u64, prefix: &str) -> Self {
        if !ui::prefs().progress {
            return Self::hidden();
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(bar_template())
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(prefix.to_string());
        Self { bar: Some(bar) }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}
