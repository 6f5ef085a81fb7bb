//! Round countdown presentation helpers.

/// Length of a round; the progress bar is relative to this.
pub const ROUND_SECONDS: u32 = 60;

/// Render seconds as `m:ss`.
pub fn format_time_left(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Urgency band used to colour the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerBand {
    /// More than 20 seconds.
    Plenty,
    /// 11 to 20 seconds.
    Low,
    Critical,
}

impl TimerBand {
    pub fn for_seconds(seconds: u32) -> Self {
        match seconds {
            s if s > 20 => TimerBand::Plenty,
            s if s > 10 => TimerBand::Low,
            _ => TimerBand::Critical,
        }
    }
}

/// Fraction of the round remaining, in `0.0..=1.0`.
pub fn progress(seconds: u32) -> f64 {
    (seconds as f64 / ROUND_SECONDS as f64).clamp(0.0, 1.0)
}
