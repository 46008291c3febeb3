//! Console progress bars for the three stages (indicatif).

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Creates stage bars; hidden when progress display is off (tests, `--no-progress`).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn hidden() -> Self {
        Self::new(false)
    }

    fn bar(&self, len: u64, template: &str) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(
            Some(len),
            if self.enabled {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("# ");
        pb.set_style(style);
        pb
    }

    /// Batch bar, e.g. ` [####      ] Fetching list 40% 3 1`, green ok count then red error count.
    pub fn batch(&self, len: u64, label: &str) -> BatchBar {
        let template = format!(" [{{bar:20}}] {} {{percent}}% {{prefix:.green}} {{msg:.red}}", label);
        let bar = self.bar(len, &template);
        bar.set_prefix("0");
        bar.set_message("0");
        BatchBar { bar, ok: 0, err: 0 }
    }

    /// Per-file transfer bar measured in percent.
    pub fn transfer(&self, display_name: &str) -> ProgressBar {
        let bar = self.bar(100, " [{bar:20}] {percent}% | {msg}");
        bar.set_message(display_name.to_string());
        bar
    }
}

/// Batch progress bar keyed on success/error counts.
pub struct BatchBar {
    bar: ProgressBar,
    ok: u64,
    err: u64,
}

impl BatchBar {
    pub fn ok(&mut self) {
        self.ok += 1;
        self.bar.set_prefix(self.ok.to_string());
        self.bar.inc(1);
    }

    pub fn err(&mut self) {
        self.err += 1;
        self.bar.set_message(self.err.to_string());
        self.bar.inc(1);
    }

    /// Advance without touching either count (items that are neither verified nor errors).
    pub fn skip(&mut self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

/// Percent complete for `received` of `total` bytes; None when the total is unknown.
pub fn percent(received: f64, total: f64) -> Option<u64> {
    if total <= 0.0 {
        return None;
    }
    Some(((received / total) * 100.0).round().clamp(0.0, 100.0) as u64)
}
