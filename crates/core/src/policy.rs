//! Timestamp policy: maps an event kind and a reference instant to a
//! concrete time slot.
//!
//! Pure code — the policy never fails and touches no shared state. All
//! inputs are pre-validated by the dispatcher, and the randomness needed
//! by appointment/general scheduling comes in through a caller-supplied
//! [`Rng`] so tests stay deterministic.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveTime, TimeZone, Timelike};
use rand::Rng;

use crate::event::EventKind;

/// Duration applied when a request omits `duration_hours` or supplies a
/// non-positive value.
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

const BUSINESS_OPEN_HOUR: u32 = 9;
const BUSINESS_CLOSE_HOUR: u32 = 17;

/// A computed (start, end) pair. `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

/// Coerce the optional wire duration to a positive value.
///
/// Absent, non-positive, NaN, and infinite inputs all fall back to the
/// one-hour default rather than being rejected.
pub fn coerce_duration(raw: Option<f64>) -> f64 {
    match raw {
        Some(hours) if hours > 0.0 && hours.is_finite() => hours,
        _ => DEFAULT_DURATION_HOURS,
    }
}

/// Compute the slot for an event of the given kind.
///
/// `duration_hours` must already be positive (see [`coerce_duration`]);
/// `now` is the reference instant the rules are evaluated against.
pub fn schedule<R: Rng>(
    kind: EventKind,
    now: DateTime<Local>,
    duration_hours: f64,
    rng: &mut R,
) -> Slot {
    match kind {
        EventKind::Meeting => meeting_slot(now, duration_hours),
        EventKind::Deadline => {
            // Deadlines are instants at the end of the current day.
            let instant = at_time(now, 23, 59, 0);
            Slot {
                start: instant,
                end: instant,
            }
        }
        EventKind::Reminder => {
            let start = now + Duration::hours(1);
            Slot { start, end: start }
        }
        EventKind::Appointment => {
            let start = now + Duration::days(rng.random_range(1..=7));
            Slot {
                start,
                end: start + hours(duration_hours),
            }
        }
        EventKind::General => {
            let start = now + Duration::hours(rng.random_range(0..=24));
            Slot {
                start,
                end: start + hours(duration_hours),
            }
        }
    }
}

/// Business-hours placement: the next whole hour inside [09:00, 17:00),
/// rolling to 09:00 tomorrow once today's window is exhausted. The end is
/// capped at the 17:00 close of the start's day.
fn meeting_slot(now: DateTime<Local>, duration_hours: f64) -> Slot {
    let open = at_time(now, BUSINESS_OPEN_HOUR, 0, 0);
    let close = at_time(now, BUSINESS_CLOSE_HOUR, 0, 0);

    let start = if now < open {
        open
    } else if now < close {
        // now.hour() <= 16 here, so the next boundary is at most 17:00.
        let next_hour = at_time(now, now.hour() + 1, 0, 0);
        if next_hour < close {
            next_hour
        } else {
            at_time(now + Duration::days(1), BUSINESS_OPEN_HOUR, 0, 0)
        }
    } else {
        at_time(now + Duration::days(1), BUSINESS_OPEN_HOUR, 0, 0)
    };

    let close_of_day = at_time(start, BUSINESS_CLOSE_HOUR, 0, 0);
    let end = (start + hours(duration_hours)).min(close_of_day);

    Slot { start, end }
}

/// Replace the wall-clock time on `reference`'s date.
///
/// DST transitions can make a local time ambiguous or nonexistent; the
/// earliest valid interpretation wins, and a time inside a DST gap falls
/// back to the reference instant itself.
fn at_time(reference: DateTime<Local>, hour: u32, min: u32, sec: u32) -> DateTime<Local> {
    let date = reference.date_naive();
    let naive = date
        .and_hms_opt(hour, min, sec)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => reference,
    }
}

/// Fractional hours as a chrono duration, at millisecond precision.
fn hours(value: f64) -> Duration {
    Duration::milliseconds((value * 3_600_000.0) as i64)
}
