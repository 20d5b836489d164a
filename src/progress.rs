//! Progress reporting utilities using indicatif.
//!
//! The finder reports through the [`ProgressCallback`] trait; [`Progress`]
//! implements it with one bar per pipeline phase, drawn on stderr so that
//! stdout stays clean for results.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Pipeline phase reported to a [`ProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Walking roots and reading sizes
    Walking,
    /// Hashing the first kilobyte of same-size files
    Prehash,
    /// Hashing full content of prefix matches
    Fullhash,
}

impl Phase {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Prehash => "prehash",
            Self::Fullhash => "fullhash",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback for duplicate finding phases.
///
/// Implementations must be cheap: hashing phases call [`on_progress`]
/// from worker threads once per file.
///
/// [`on_progress`]: ProgressCallback::on_progress
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 when unknown (walking).
    fn on_phase_start(&self, phase: Phase, total: usize);

    /// Called for each item processed (`current` is 1-based).
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: Phase);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<(Phase, ProgressBar)>>,
}

impl Progress {
    /// Create a reporter drawing to stderr.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfunnel::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Create a reporter that never draws. Useful in tests.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            active: Mutex::new(None),
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase, total: usize) {
        let pb = match phase {
            Phase::Walking => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            Phase::Prehash | Phase::Fullhash => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message(if phase == Phase::Prehash {
                    "Prehashing"
                } else {
                    "Full hashing"
                });
                pb
            }
        };

        if let Ok(mut active) = self.active.lock() {
            if let Some((_, previous)) = active.replace((phase, pb)) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if let Ok(active) = self.active.lock() {
            if let Some((_, pb)) = active.as_ref() {
                pb.set_position(current as u64);
                pb.set_message(truncate_path(path, 30));
            }
        }
    }

    fn on_phase_end(&self, phase: Phase) {
        if let Ok(mut active) = self.active.lock() {
            if active.as_ref().is_some_and(|(p, _)| *p == phase) {
                if let Some((_, pb)) = active.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if let Ok(active) = self.active.lock() {
            if let Some((_, pb)) = active.as_ref() {
                pb.set_message(message.to_string());
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let count = file_name.chars().count();
    if count + 4 > max_len {
        let tail: String = file_name.chars().skip(count + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
