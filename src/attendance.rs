use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{AttendanceRecord, AttendanceStatus, AttendanceSummary};

/// The school year opens in September.
const ACADEMIC_YEAR_START_MONTH: u32 = 9;

/// Friday and Saturday are the weekend.
fn is_school_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Fri | Weekday::Sat)
}

pub fn academic_year_start(today: NaiveDate) -> NaiveDate {
    let year = if today.month() >= ACADEMIC_YEAR_START_MONTH {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, ACADEMIC_YEAR_START_MONTH, 1).unwrap_or(today)
}

pub fn count_school_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_school_day(*day))
        .count() as u32
}

pub fn summarize_attendance(
    records: &[AttendanceRecord],
    enrollment_date: Option<NaiveDate>,
    today: NaiveDate,
) -> AttendanceSummary {
    let academic_start = academic_year_start(today);
    let start = enrollment_date
        .filter(|enrolled| *enrolled > academic_start)
        .unwrap_or(academic_start);
    let school_days = count_school_days(start, today);

    let count = |status: AttendanceStatus| {
        records.iter().filter(|r| r.status == status).count() as u32
    };
    let absent = count(AttendanceStatus::Absent);
    let excused = count(AttendanceStatus::Excused);
    let late = count(AttendanceStatus::Late);

    let present = school_days.saturating_sub(absent + excused);
    let rate = if school_days > 0 {
        (f64::from(present) / f64::from(school_days) * 100.0).round() as u32
    } else {
        100
    };

    AttendanceSummary {
        school_days,
        present,
        absent,
        late,
        excused,
        rate,
    }
}
