//! Trading-session calendar.
//!
//! Session math is done in the exchange's own timezone so daylight-saving
//! transitions shift the UTC open/close instants the way the exchange
//! actually shifts them. Weekends are skipped; exchange holidays are not
//! modeled, which only makes off-hours TTLs conservative (a holiday reads as
//! a regular trading day, so a freeze expires earlier than it had to).

use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use marketdesk_core::config::SessionPolicy;

/// Answers "is the market open" and "when does it open next" for one
/// exchange session, and derives the off-hours freeze TTL from the latter.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    policy: SessionPolicy,
}

impl SessionClock {
    /// Create a clock for the given session definition.
    #[must_use]
    pub fn new(policy: SessionPolicy) -> Self {
        Self { policy }
    }

    fn is_trading_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Whether the session is open at `now`. The open minute is inside the
    /// session, the close minute is not.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.policy.timezone);
        if !Self::is_trading_day(local.date_naive()) {
            return false;
        }
        let minute = local.hour() * 60 + local.minute();
        minute >= self.policy.open_minute && minute < self.policy.close_minute
    }

    /// The next session open strictly after the current one begins, or
    /// today's open if `now` is a trading day still before the open minute.
    #[must_use]
    pub fn next_open(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.policy.timezone);
        let minute = local.hour() * 60 + local.minute();
        let mut date = local.date_naive();
        if !Self::is_trading_day(date) || minute >= self.policy.open_minute {
            date = date.succ_opt().expect("calendar overflow");
            while !Self::is_trading_day(date) {
                date = date.succ_opt().expect("calendar overflow");
            }
        }
        self.open_instant(date)
    }

    /// Resolve the session-open wall clock on `date` to a UTC instant using
    /// the offset actually in force on that date.
    fn open_instant(&self, date: NaiveDate) -> DateTime<Utc> {
        let tz: Tz = self.policy.timezone;
        let naive = date
            .and_hms_opt(self.policy.open_minute / 60, self.policy.open_minute % 60, 0)
            .expect("open minute is a valid wall-clock time");
        match tz.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => dt,
            chrono::LocalResult::Ambiguous(earliest, _) => earliest,
            // Spring-forward gap: the wall clock one hour later always exists.
            chrono::LocalResult::None => tz
                .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
                .expect("wall clock adjacent to a transition gap resolves"),
        }
        .with_timezone(&Utc)
    }

    /// TTL that keeps a cached off-hours snapshot alive until shortly after
    /// the next open, floored at `min` so a snapshot taken moments before
    /// the bell still gets a usable lifetime. While the session is open the
    /// freeze does not apply and `min` is returned as-is.
    #[must_use]
    pub fn off_hours_freeze_ttl(&self, now: DateTime<Utc>, min: Duration) -> Duration {
        if self.is_open(now) {
            return min;
        }
        let until_open = (self.next_open(now) - now).to_std().unwrap_or_default();
        (until_open + self.policy.safety_buffer).max(min)
    }
}
