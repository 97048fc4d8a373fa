//! Simple wrappers to make many errors hard to make

#![warn(unused_crate_dependencies)]

use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Intended to be similar to Duration but always clear that it is in Seconds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Seconds(u64);

/// Whole minutes, used for caller supplied time-to-live values
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Minutes(u64);

/// Intended to be similar to Instant but keeps on ticking if the computer is
/// sleeping, only works with dates/times after the unix epoch.
///
/// Stored with millisecond precision because that is the precision the
/// persisted session records use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        Self(
            web_time::SystemTime::UNIX_EPOCH
                .elapsed()
                .expect("expected date on system to be after the epoch")
                .as_millis() as u64,
        )
    }

    pub const fn from_epoch_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_epoch_millis(&self) -> u64 {
        self.0
    }

    pub fn as_utc_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.0.try_into().unwrap())
            .expect("wow this program wasn't meant to last that long")
    }

    pub fn display_as_utc_datetime(&self) -> String {
        self.as_utc_datetime().format("%c").to_string()
    }

    /// Returns the number of whole seconds since `past_time` or None if
    /// `past_time` is in the future
    pub fn seconds_since(self, past_time: Self) -> Option<Seconds> {
        if self.0 < past_time.0 {
            None
        } else {
            Some(self - past_time)
        }
    }
}

impl std::ops::Add<Seconds> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Seconds) -> Self::Output {
        Self(self.0 + rhs.0 * 1000)
    }
}

impl std::ops::AddAssign<Seconds> for Timestamp {
    fn add_assign(&mut self, rhs: Seconds) {
        self.0 += rhs.0 * 1000
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Seconds;

    fn sub(self, rhs: Self) -> Self::Output {
        Seconds::new((self.0 - rhs.0) / 1000)
    }
}

impl Seconds {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Returns true if this represents zero seconds
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(&self, elapsed: Seconds) -> Seconds {
        Self(self.0.saturating_sub(elapsed.0))
    }
}

impl Minutes {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl From<Minutes> for Seconds {
    fn from(value: Minutes) -> Self {
        Self(value.0 * 60)
    }
}

impl From<u64> for Minutes {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u64> for Seconds {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Seconds> for Duration {
    fn from(value: Seconds) -> Self {
        Duration::from_secs(value.0)
    }
}

impl From<Duration> for Seconds {
    fn from(value: Duration) -> Self {
        value.as_secs().into()
    }
}

impl std::ops::Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Source of the current wall clock time
///
/// Injected instead of calling [`Timestamp::now`] directly so state that
/// depends on elapsed time can be tested without real waiting
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// [`Clock`] that only moves when told to, for deterministic tests
///
/// Clones share the same underlying time so a copy can be kept to advance the
/// clock after the original has been handed off
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn starting_at(start: Timestamp) -> Self {
        Self(Arc::new(AtomicU64::new(start.as_epoch_millis())))
    }

    pub fn advance(&self, duration: Seconds) {
        self.0
            .fetch_add(duration.as_secs() * 1000, Ordering::SeqCst);
    }

    pub fn set(&self, now: Timestamp) {
        self.0.store(now.as_epoch_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_epoch_millis(self.0.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::same_instant(5_000, 5_000, Some(Seconds::new(0)))]
    #[case::whole_seconds(65_000, 5_000, Some(Seconds::new(60)))]
    #[case::sub_second_rounds_down(5_900, 5_000, Some(Seconds::new(0)))]
    #[case::past_time_in_future(5_000, 6_000, None)]
    fn seconds_since(#[case] now: u64, #[case] past: u64, #[case] expected: Option<Seconds>) {
        // Arrange
        let now = Timestamp::from_epoch_millis(now);
        let past = Timestamp::from_epoch_millis(past);

        // Act
        let actual = now.seconds_since(past);

        // Assert
        assert_eq!(actual, expected);
    }

    #[test]
    fn add_seconds_moves_by_millis() {
        let start = Timestamp::from_epoch_millis(1_000);
        assert_eq!(
            start + Seconds::new(30),
            Timestamp::from_epoch_millis(31_000)
        );
    }

    #[test]
    fn minutes_convert_to_seconds() {
        assert_eq!(Seconds::from(Minutes::new(30)), Seconds::new(1800));
    }

    #[test]
    fn manual_clock_advances_on_request_only() {
        // Arrange
        let clock = ManualClock::starting_at(Timestamp::from_epoch_millis(0));
        let watcher_copy = clock.clone();

        // Act
        clock.advance(Seconds::new(90));

        // Assert - clones observe the same time
        assert_eq!(clock.now(), Timestamp::from_epoch_millis(90_000));
        assert_eq!(watcher_copy.now(), clock.now());
    }
}
