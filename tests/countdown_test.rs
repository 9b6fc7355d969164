use festive_ngin::countdown::{CELEBRATION, Countdown, Remaining, Typewriter};
use instant::Duration;

#[test]
fn one_hour_left() {
    let remaining = Remaining::from_millis(3_600_000);
    assert_eq!(
        remaining,
        Remaining::Left {
            hours: 1,
            minutes: 0,
            seconds: 0
        }
    );
    assert_eq!(remaining.to_string(), "1h 0m 0s remaining");
}

#[test]
fn components_are_floored() {
    let diff = 26 * 3_600_000 + 59 * 60_000 + 59_999;
    assert_eq!(Remaining::from_millis(diff).to_string(), "26h 59m 59s remaining");
    assert_eq!(Remaining::from_millis(999).to_string(), "0h 0m 0s remaining");
}

#[test]
fn boundary_shows_celebration() {
    assert_eq!(Remaining::from_millis(0), Remaining::Arrived);
    assert_eq!(Remaining::from_millis(-5), Remaining::Arrived);
    assert_eq!(Remaining::Arrived.to_string(), CELEBRATION);
    assert_eq!(CELEBRATION, "🎆 Welcome to the New Year! 🎆");
}

#[test]
fn arrival_is_latched() {
    let mut countdown = Countdown::new(2027, 10_000);
    assert!(!countdown.has_arrived());
    assert_eq!(countdown.at(9_000).to_string(), "0h 0m 1s remaining");
    assert_eq!(countdown.at(10_000), Remaining::Arrived);
    assert!(countdown.has_arrived());
    // The clock going backwards does not restart the countdown.
    assert_eq!(countdown.at(0), Remaining::Arrived);
}

#[test]
fn targets_the_following_year() {
    use chrono::{Datelike, Local, TimeZone};
    let now = Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let countdown = Countdown::next_year_from(now).unwrap();
    assert_eq!(countdown.target_year(), 2027);
    let target = Local.timestamp_millis_opt(countdown.target_millis()).unwrap();
    assert_eq!((target.year(), target.month(), target.day()), (2027, 1, 1));
    assert!(countdown.target_millis() > now.timestamp_millis());
}

#[test]
fn typewriter_reveals_one_char_per_interval() {
    let interval = Duration::from_millis(120);
    let mut typewriter = Typewriter::new("🎉 Hi", interval);
    assert_eq!(typewriter.text(), "");

    assert_eq!(typewriter.update(Duration::ZERO).as_deref(), Some("🎉"));
    assert_eq!(typewriter.update(Duration::from_millis(100)), None);
    assert_eq!(typewriter.update(Duration::from_millis(20)).as_deref(), Some("🎉 "));
    assert_eq!(typewriter.update(interval * 2).as_deref(), Some("🎉 Hi"));
    assert!(typewriter.is_done());
    assert_eq!(typewriter.update(interval * 10), None);
    assert_eq!(typewriter.text(), "🎉 Hi");
}

#[test]
fn empty_greeting_is_done_immediately() {
    let mut typewriter = Typewriter::new("", Duration::from_millis(120));
    assert!(typewriter.is_done());
    assert_eq!(typewriter.update(Duration::from_secs(1)), None);
}
