//! Countdown to the next new year and the typewriter greeting.

use std::fmt;

use chrono::{DateTime, Datelike, Local, LocalResult, TimeZone};
use instant::Duration;

pub const CELEBRATION: &str = "🎆 Welcome to the New Year! 🎆";

const MILLIS_PER_HOUR: i64 = 1000 * 60 * 60;
const MILLIS_PER_MINUTE: i64 = 1000 * 60;

/// What the countdown shows at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remaining {
    Left { hours: i64, minutes: i64, seconds: i64 },
    Arrived,
}

impl Remaining {
    /// Split the time left (in milliseconds) into whole hours, minutes and seconds.
    pub fn from_millis(diff: i64) -> Self {
        if diff <= 0 {
            return Remaining::Arrived;
        }
        Remaining::Left {
            hours: diff / MILLIS_PER_HOUR,
            minutes: (diff / MILLIS_PER_MINUTE) % 60,
            seconds: (diff / 1000) % 60,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Left {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours}h {minutes}m {seconds}s remaining"),
            Remaining::Arrived => f.write_str(CELEBRATION),
        }
    }
}

/// Counts down to midnight of January 1st of `target_year`.
///
/// Once the boundary has been observed the countdown stays arrived, even if
/// the clock is later set back.
#[derive(Clone, Debug)]
pub struct Countdown {
    target_year: i32,
    target_millis: i64,
    arrived: bool,
}

impl Countdown {
    pub fn new(target_year: i32, target_millis: i64) -> Self {
        Self {
            target_year,
            target_millis,
            arrived: false,
        }
    }

    /// Count down to the year after `now`, in the local time zone.
    pub fn next_year_from(now: DateTime<Local>) -> anyhow::Result<Self> {
        let target_year = now.year() + 1;
        let target = match Local.with_ymd_and_hms(target_year, 1, 1, 0, 0, 0) {
            LocalResult::Single(target) => target,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                anyhow::bail!("midnight of January 1st {target_year} does not exist locally")
            }
        };
        Ok(Self::new(target_year, target.timestamp_millis()))
    }

    pub fn target_year(&self) -> i32 {
        self.target_year
    }

    pub fn target_millis(&self) -> i64 {
        self.target_millis
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Evaluate the countdown at `now_millis` (milliseconds since the epoch).
    pub fn at(&mut self, now_millis: i64) -> Remaining {
        if self.arrived {
            return Remaining::Arrived;
        }
        let remaining = Remaining::from_millis(self.target_millis - now_millis);
        if remaining == Remaining::Arrived {
            self.arrived = true;
        }
        remaining
    }
}

/// Reveals a text one character at a time.
#[derive(Clone, Debug)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
    interval: Duration,
    since_last: Duration,
}

impl Typewriter {
    /// The first character appears immediately, every further one after `interval`.
    pub fn new(text: &str, interval: Duration) -> Self {
        Self {
            chars: text.chars().collect(),
            shown: 0,
            interval,
            since_last: interval,
        }
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.chars.len()
    }

    pub fn text(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }

    /// Advance the clock. Returns the new text if at least one character was added.
    pub fn update(&mut self, dt: Duration) -> Option<String> {
        if self.is_done() {
            return None;
        }
        self.since_last += dt;
        let mut changed = false;
        while !self.is_done() && self.since_last >= self.interval {
            self.since_last -= self.interval;
            self.shown += 1;
            changed = true;
        }
        changed.then(|| self.text())
    }
}
