//! Business calendar
//!
//! Wraps the configured time window, timezone, and business-day flag and
//! answers every "when" question the pipeline asks. Business hours are a
//! fixed local window (09:00-18:00); business days are Monday-Friday.

use crate::stream::weighted_index;
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::Rng;

/// Local opening hour
const OPEN_HOUR: u32 = 9;
/// Local closing hour
const CLOSE_HOUR: u32 = 18;

/// Hour-of-day activity weights; business hours dominate, evenings taper
const HOUR_WEIGHTS: [f64; 24] = [
    0.1, 0.1, 0.1, 0.1, 0.2, 0.3, // 0-5
    0.4, 0.6, 0.8, 1.0, 1.2, 1.0, // 6-11
    0.8, 0.6, 0.8, 1.0, 1.2, 1.0, // 12-17
    0.8, 0.6, 0.4, 0.3, 0.2, 0.1, // 18-23
];

/// Scheduling failures - always fatal, the window itself is impossible
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// The configured window contains zero schedulable days
    #[error("window {start}..{end} contains no schedulable day")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    /// Window end precedes start
    #[error("window end {end} precedes start {start}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Bias applied when sampling an instant within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursBias {
    /// Strictly inside the 09:00-18:00 local window
    BusinessHours,
    /// Hour-of-day weighted; mostly business hours, occasional evenings
    Natural,
    /// Strictly outside the business window
    OffHours,
}

/// The run's timestamp authority
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    tz: Tz,
    start: NaiveDate,
    end: NaiveDate,
    business_days_only: bool,
}

impl BusinessCalendar {
    /// Build a calendar over a validated window
    ///
    /// # Errors
    /// [`SchedulingError::InvertedWindow`] if `end < start`;
    /// [`SchedulingError::EmptyWindow`] if no schedulable day exists.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        tz: Tz,
        business_days_only: bool,
    ) -> Result<Self, SchedulingError> {
        if end < start {
            return Err(SchedulingError::InvertedWindow { start, end });
        }
        let calendar = Self {
            tz,
            start,
            end,
            business_days_only,
        };
        if calendar.days().is_empty() {
            return Err(SchedulingError::EmptyWindow { start, end });
        }
        Ok(calendar)
    }

    /// Configured timezone
    #[inline]
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Configured window bounds (inclusive)
    #[inline]
    #[must_use]
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// Whether a date falls on a business day (Monday-Friday)
    #[inline]
    #[must_use]
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        date.weekday().number_from_monday() <= 5
    }

    /// Whether events may be scheduled on this date
    ///
    /// With `business_days_only` every weekend day is excluded; otherwise
    /// any date inside the window is schedulable.
    #[inline]
    #[must_use]
    pub fn is_schedulable(&self, date: NaiveDate) -> bool {
        date >= self.start
            && date <= self.end
            && (!self.business_days_only || self.is_business_day(date))
    }

    /// All schedulable days in the window, ascending
    #[must_use]
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            if self.is_schedulable(current) {
                days.push(current);
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }

    /// The local business-hours window for a date, as UTC instants
    #[must_use]
    pub fn business_hours_for(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.instant(date, OPEN_HOUR, 0, 0),
            self.instant(date, CLOSE_HOUR, 0, 0),
        )
    }

    /// First schedulable day at or after `date`, if any remains in the window
    #[must_use]
    pub fn align_forward(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date.max(self.start);
        while current <= self.end {
            if self.is_schedulable(current) {
                return Some(current);
            }
            current = current.succ_opt()?;
        }
        None
    }

    /// Advance by `n` schedulable days (n = 0 returns the aligned date)
    ///
    /// May run past the window end; callers bound the result themselves.
    #[must_use]
    pub fn add_business_days(&self, date: NaiveDate, n: u32) -> NaiveDate {
        let mut current = date;
        let mut remaining = n;
        while remaining > 0 {
            current = match current.succ_opt() {
                Some(next) => next,
                None => return current,
            };
            if !self.business_days_only || self.is_business_day(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Construct the UTC instant for a local wall-clock time on a date
    ///
    /// DST-ambiguous local times resolve to the earlier instant; skipped
    /// local times fall back to the naive reading. Out-of-range wall-clock
    /// components clamp to midnight.
    #[must_use]
    pub fn instant(&self, date: NaiveDate, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        let time = NaiveTime::from_hms_opt(hour, minute, second).unwrap_or_default();
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&naive),
        }
    }

    /// Whether an instant falls inside local business hours on a business day
    #[must_use]
    pub fn is_business_hours(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.tz);
        if local.date_naive().weekday().number_from_monday() > 5 {
            return false;
        }
        let t = local.time();
        let after_open = t.hour() >= OPEN_HOUR;
        let before_close =
            t.hour() < CLOSE_HOUR || (t.hour() == CLOSE_HOUR && t.minute() == 0 && t.second() == 0);
        after_open && before_close
    }

    /// Sample an instant on a given date honoring the bias
    #[must_use]
    pub fn sample_instant(&self, rng: &mut StdRng, date: NaiveDate, bias: HoursBias) -> DateTime<Utc> {
        let hour = match bias {
            HoursBias::BusinessHours => rng.gen_range(OPEN_HOUR..CLOSE_HOUR),
            HoursBias::Natural => weighted_index(rng, &HOUR_WEIGHTS) as u32,
            HoursBias::OffHours => {
                // 0-8 and 19-23
                let off: [u32; 14] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 19, 20, 21, 22, 23];
                off[rng.gen_range(0..off.len())]
            }
        };
        let minute = rng.gen_range(0..60);
        let second = rng.gen_range(0..60);
        self.instant(date, hour, minute, second)
    }

    /// Sample an instant between two bounds, preferring business hours
    ///
    /// Picks a schedulable day inside the bound dates, samples within it,
    /// then clamps to the bounds.
    #[must_use]
    pub fn sample_instant_between(
        &self,
        rng: &mut StdRng,
        lo: DateTime<Utc>,
        hi: DateTime<Utc>,
        bias: HoursBias,
    ) -> DateTime<Utc> {
        let lo_date = lo.with_timezone(&self.tz).date_naive();
        let hi_date = hi.with_timezone(&self.tz).date_naive();
        let candidates: Vec<NaiveDate> = self
            .days()
            .into_iter()
            .filter(|d| *d >= lo_date && *d <= hi_date)
            .collect();
        let date = if candidates.is_empty() {
            lo_date
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        };
        self.sample_instant(rng, date, bias).clamp(lo, hi)
    }

    /// Realistic reply delay for a thread message
    #[must_use]
    pub fn reply_delay(&self, rng: &mut StdRng, urgent: bool) -> Duration {
        let minutes = if urgent {
            rng.gen_range(5..=120)
        } else {
            rng.gen_range(30..=480)
        };
        Duration::minutes(minutes)
    }

    /// Push instants forward so consecutive events keep a minimum gap
    pub fn ensure_min_gap(&self, times: &mut [DateTime<Utc>], gap_minutes: i64) {
        times.sort_unstable();
        let gap = Duration::minutes(gap_minutes);
        for i in 1..times.len() {
            let floor = times[i - 1] + gap;
            if times[i] < floor {
                times[i] = floor;
            }
        }
    }
}
