/// Fixed time budget per question, in seconds.
pub const QUESTION_SECONDS: u32 = 60;

/// Result of delivering one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// The timer is not running; the tick was ignored.
    Idle,
    /// The countdown continues with this many seconds left.
    Running(u32),
    /// The countdown just reached zero. Reported exactly once; the timer
    /// has already stopped itself.
    Expired,
}

/// Per-question countdown.
///
/// An explicit, synchronously cancellable state machine: the driver calls
/// `tick` once per wall-clock second, and `start` always cancels whatever
/// countdown was running before resetting. There is never more than one
/// live countdown because ticks only reach the timer through the single
/// driver loop.
#[derive(Debug, Clone)]
pub struct QuestionTimer {
    remaining: u32,
    running: bool,
}

impl QuestionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: QUESTION_SECONDS,
            running: false,
        }
    }

    /// Cancels any running countdown, resets to the full budget, and
    /// begins ticking.
    pub fn start(&mut self) {
        self.remaining = QUESTION_SECONDS;
        self.running = true;
    }

    /// Cancels the countdown. Safe to call when not running.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            TimerTick::Expired
        } else {
            TimerTick::Running(self.remaining)
        }
    }
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
