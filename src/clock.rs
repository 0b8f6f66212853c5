use time::{macros::format_description, Date, OffsetDateTime, Time};

pub trait Clock: Send + Sync {
    /// Current wall-clock time in the local offset.
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> Date {
        self.now().date()
    }

    /// Hour and minute of `now()`, seconds dropped.
    fn time_of_day(&self) -> Time {
        let now = self.now();
        Time::from_hms(now.hour(), now.minute(), 0).unwrap_or(Time::MIDNIGHT)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        // now_local fails when the offset cannot be determined soundly
        // (multi-threaded process on some unix targets)
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub(crate) fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn fixed_clock_truncates_to_minutes() {
        let clock = FixedClock(datetime!(2025-08-30 08:05:59 UTC));
        assert_eq!(format_date(clock.today()), "2025-08-30");
        assert_eq!(clock.time_of_day(), Time::from_hms(8, 5, 0).unwrap());
    }
}
