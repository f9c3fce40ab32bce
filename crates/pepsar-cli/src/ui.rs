use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use pepsar::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Drives indicatif bars from the engine's [`Progress`] events.
///
/// The engine invokes the callback inline from the computing thread, so the
/// bar state sits behind a mutex and the handler does no blocking work.
pub struct UiHandler {
    mp: MultiProgress,
    state: Arc<Mutex<BarState>>,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
}

impl UiHandler {
    pub fn new() -> Self {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        Self {
            mp,
            state: Arc::new(Mutex::new(BarState::default())),
        }
    }

    /// A callback handing every progress event to this handler; callable any
    /// number of times, all callbacks share the same bar state.
    pub fn callback(&self) -> ProgressCallback {
        let mp = self.mp.clone();
        let state = Arc::clone(&self.state);
        Box::new(move |progress| Self::handle(&mp, &state, progress))
    }

    fn handle(mp: &MultiProgress, state: &Mutex<BarState>, progress: Progress) {
        let mut state = state.lock().expect("UI bar state poisoned");
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(name.to_string());

                state.active_bar = Some(pb);
                state.base_message = name.to_string();
            }
            Progress::PhaseFinish => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }

                mp.println(format!("✓ {}", state.base_message)).ok();
                state.base_message.clear();
            }
            Progress::TaskStart { total_steps } => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total_steps);
                    bar.set_position(0);
                    bar.disable_steady_tick();
                }
            }
            Progress::TaskIncrement => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.finish();
                }
            }
            Progress::Message(msg) => {
                mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<40} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("Invalid template")
            .progress_chars("━╸ ")
    }
}

impl Default for UiHandler {
    fn default() -> Self {
        Self::new()
    }
}
