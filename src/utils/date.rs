use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Today in the reference timezone.
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `[today - (days - 1), today]`, at least one day.
pub fn last_days(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let span = u64::from(days.max(1) - 1);
    let from = today.checked_sub_days(Days::new(span)).unwrap_or(today);
    (from, today)
}

fn month_last_day(y: i32, m: u32) -> Option<NaiveDate> {
    let (ny, nm) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// First and last day covered by a single period token.
fn period_bounds(p: &str) -> Option<(NaiveDate, NaiveDate)> {
    let p = p.trim();
    match p.len() {
        // YYYY
        4 => {
            let y: i32 = p.parse().ok()?;
            Some((
                NaiveDate::from_ymd_opt(y, 1, 1)?,
                NaiveDate::from_ymd_opt(y, 12, 31)?,
            ))
        }
        // YYYY-MM
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d").ok()?;
            Some((first, month_last_day(first.year(), first.month())?))
        }
        // YYYY-MM-DD
        10 => {
            let d = parse_date(p)?;
            Some((d, d))
        }
        _ => None,
    }
}

/// Parse a period filter into inclusive date bounds.
///
/// Supported: `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and ranges `START:END` made of
/// any two of those (e.g. `2025-03:2025-04-15`).
pub fn parse_period(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidDate(format!("invalid period: {p}"));

    let (from, to) = match p.split_once(':') {
        Some((start, end)) => {
            let (from, _) = period_bounds(start).ok_or_else(invalid)?;
            let (_, to) = period_bounds(end).ok_or_else(invalid)?;
            (from, to)
        }
        None => period_bounds(p).ok_or_else(invalid)?,
    };

    if from > to {
        return Err(AppError::InvalidDate(format!(
            "period start {from} is after end {to}"
        )));
    }
    Ok((from, to))
}

/// UTC instant of local midnight of `date`. On days where midnight does
/// not exist (DST jump) the first valid hour is used.
pub fn day_start_utc(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    (0..3)
        .filter_map(|h| {
            let t = NaiveTime::from_hms_opt(h, 0, 0)?;
            tz.from_local_datetime(&date.and_time(t)).earliest()
        })
        .next()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc())
}

/// Half-open UTC range covering the local days `from..=to`.
pub fn days_to_utc(from: NaiveDate, to: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let after = to.succ_opt().unwrap_or(to);
    (day_start_utc(from, tz), day_start_utc(after, tz))
}
