// Durations, offsets and time signatures.
//
// All time is counted in whole quarter notes: a quarter is 1, a half 2, a
// whole 4. The counterpoint engine never subdivides below a quarter, so an
// integer count is exact.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Length of a note in quarter-note units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Duration(u32);

impl Duration {
    pub const ZERO: Duration = Duration(0);
    pub const QUARTER: Duration = Duration(1);
    pub const HALF: Duration = Duration(2);
    pub const WHOLE: Duration = Duration(4);

    pub const fn quarters(n: u32) -> Duration {
        Duration(n)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::ZERO, |a, b| a + b)
    }
}

/// Position from the start of a measure (or of a run of measures), in
/// quarter-note units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Offset(u32);

impl Offset {
    pub const ZERO: Offset = Offset(0);

    pub const fn quarters(n: u32) -> Offset {
        Offset(n)
    }

    /// 1-indexed beat number: `beat(1)` is the downbeat.
    pub const fn beat(n: u32) -> Offset {
        assert!(n >= 1, "beats are numbered from 1");
        Offset(n - 1)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Signed distance from `earlier` to `self`.
    pub fn since(self, earlier: Offset) -> i64 {
        self.0 as i64 - earlier.0 as i64
    }
}

impl Add<Duration> for Offset {
    type Output = Offset;

    fn add(self, rhs: Duration) -> Offset {
        Offset(self.0 + rhs.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_unit: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature::new(4, 4);
    pub const CUT: TimeSignature = TimeSignature::new(2, 2);

    pub const fn new(beats: u32, beat_unit: u32) -> TimeSignature {
        TimeSignature { beats, beat_unit }
    }

    /// Length of one measure.
    pub fn measure_duration(self) -> Duration {
        Duration(self.beats * 4 / self.beat_unit)
    }

    pub fn name(self) -> String {
        format!("{}/{}", self.beats, self.beat_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_durations() {
        assert_eq!(TimeSignature::COMMON.measure_duration(), Duration::WHOLE);
        assert_eq!(TimeSignature::CUT.measure_duration(), Duration::WHOLE);
        assert_eq!(TimeSignature::new(3, 4).measure_duration(), Duration::quarters(3));
        assert_eq!(TimeSignature::new(6, 8).measure_duration(), Duration::quarters(3));
        assert_eq!(TimeSignature::CUT.name(), "2/2");
    }

    #[test]
    fn offsets_and_beats() {
        assert_eq!(Offset::beat(1), Offset::ZERO);
        assert_eq!(Offset::beat(4), Offset::quarters(3));
        assert_eq!(Offset::ZERO + Duration::HALF, Offset::quarters(2));
        assert_eq!(Offset::quarters(1).since(Offset::quarters(4)), -3);
    }

    #[test]
    fn durations_sum() {
        let total: Duration = [Duration::QUARTER, Duration::HALF, Duration::QUARTER]
            .into_iter()
            .sum();
        assert_eq!(total, Duration::WHOLE);
    }
}
