//! Occurrence expansion for repeating events.
//!
//! Given a start instant, a frequency, and a total occurrence count, compute
//! the concrete occurrence instants. Each step is taken from the previous
//! actual occurrence, so a month-end clamp is not sticky: Jan 31 monthly
//! yields Feb 28 (or 29) and then Mar 28 (or 29), not Mar 31.

use chrono::{Days, Months, NaiveDateTime};

use crate::error::{CoreError, Result, ValidationError};
use crate::item::Frequency;

/// Compute the ordered occurrence instants for a repeat rule.
///
/// Returns exactly `times` strictly increasing instants; the first element
/// is `start` itself. `times` must be at least 1.
///
/// # Errors
/// Returns a validation error when `times` is zero, and an invalid-argument
/// error if advancing the date would leave chrono's representable range.
pub fn expand(start: NaiveDateTime, frequency: Frequency, times: u32) -> Result<Vec<NaiveDateTime>> {
    if times < 1 {
        return Err(ValidationError::ZeroOccurrences.into());
    }

    let mut occurrences = Vec::with_capacity(times as usize);
    occurrences.push(start);

    let mut current = start;
    for _ in 1..times {
        current = advance(current, frequency)?;
        occurrences.push(current);
    }

    Ok(occurrences)
}

/// Advance an instant by one period of `frequency`.
///
/// Monthly and yearly steps preserve the day-of-month where possible and
/// clamp to the last valid day of the target month otherwise (Jan 31 -> Feb
/// 28, Feb 29 -> Feb 28 in non-leap years). The time of day never changes.
fn advance(from: NaiveDateTime, frequency: Frequency) -> Result<NaiveDateTime> {
    let next = match frequency {
        Frequency::Daily => from.checked_add_days(Days::new(1)),
        Frequency::Weekly => from.checked_add_days(Days::new(7)),
        Frequency::Monthly => from.checked_add_months(Months::new(1)),
        Frequency::Yearly => from.checked_add_months(Months::new(12)),
    };
    next.ok_or_else(|| CoreError::InvalidArgument {
        field: "start",
        message: format!("advancing {from} by one {} period overflows", frequency.as_str()),
    })
}
