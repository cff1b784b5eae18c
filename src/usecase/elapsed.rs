use time::{Duration, OffsetDateTime, Weekday};

const SECONDS_PER_HOUR: f64 = 3_600.0;
const HOURS_PER_DAY: f64 = 24.0;
const BUSINESS_DAYS_PER_WEEK: u64 = 5;
const SECONDS_PER_WEEK: i64 = 7 * 86_400;

/// How "enough time has passed" is measured for turnaround and rolling
/// reminder thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeModel {
    /// Plain elapsed hours.
    #[default]
    WallClock,
    /// Whole Monday–Friday days (UTC), hours rounded up to days. Holidays are
    /// not known about.
    BusinessDay,
}

impl TimeModel {
    /// Whether `hours` have passed between `reference` and `now`.
    ///
    /// A non-positive duration has always elapsed.
    pub fn has_elapsed(self, reference: OffsetDateTime, hours: f64, now: OffsetDateTime) -> bool {
        if hours.is_nan() || hours <= 0.0 {
            return true;
        }
        match self {
            TimeModel::WallClock => wall_clock_elapsed(reference, hours, now),
            TimeModel::BusinessDay => business_days_elapsed(reference, hours, now),
        }
    }

    /// The earliest instant at which `has_elapsed` turns true, if it is
    /// reachable. Only used for logging.
    pub fn due_at(self, reference: OffsetDateTime, hours: f64) -> Option<OffsetDateTime> {
        if hours.is_nan() || hours <= 0.0 {
            return Some(reference);
        }
        match self {
            TimeModel::WallClock => {
                let secs = hours * SECONDS_PER_HOUR;
                if secs >= i64::MAX as f64 {
                    return None;
                }
                reference.checked_add(Duration::seconds_f64(secs))
            }
            TimeModel::BusinessDay => business_day_due(reference, required_business_days(hours)),
        }
    }
}

fn wall_clock_elapsed(reference: OffsetDateTime, hours: f64, now: OffsetDateTime) -> bool {
    (now - reference).as_seconds_f64() >= hours * SECONDS_PER_HOUR
}

fn required_business_days(hours: f64) -> u64 {
    // `as` saturates, so hours past u64::MAX days map to u64::MAX
    (hours / HOURS_PER_DAY).ceil() as u64
}

fn business_days_elapsed(reference: OffsetDateTime, hours: f64, now: OffsetDateTime) -> bool {
    business_day_due(reference, required_business_days(hours)).is_some_and(|due| due <= now)
}

/// Step one calendar day at a time from `reference`, counting the steps that
/// land on a business day; the instant of the `days`-th counted step.
/// `None` once it is past the representable range.
fn business_day_due(reference: OffsetDateTime, days: u64) -> Option<OffsetDateTime> {
    if days == 0 {
        return Some(reference);
    }
    // seven steps always count five business days
    let weeks = (days - 1) / BUSINESS_DAYS_PER_WEEK;
    let skipped = i64::try_from(weeks).ok()?.checked_mul(SECONDS_PER_WEEK)?;
    let mut cursor = reference.checked_add(Duration::seconds(skipped))?;
    let mut remaining = days - weeks * BUSINESS_DAYS_PER_WEEK;
    while remaining > 0 {
        cursor = cursor.checked_add(Duration::DAY)?;
        if is_business_day(cursor.weekday()) {
            remaining -= 1;
        }
    }
    Some(cursor)
}

fn is_business_day(day: Weekday) -> bool {
    !matches!(day, Weekday::Saturday | Weekday::Sunday)
}
