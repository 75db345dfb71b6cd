use crate::error::AuthError;
use std::fmt::Display;
use std::str::FromStr;
use time::{Date, Duration, Month, OffsetDateTime};

//--------------------------------------------------------------------------------------------------
// Relative expiration such as "12h", "30d" or "1y"
//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl ExpiryUnit {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'h' => Some(ExpiryUnit::Hours),
            'd' => Some(ExpiryUnit::Days),
            'w' => Some(ExpiryUnit::Weeks),
            'm' => Some(ExpiryUnit::Months),
            'y' => Some(ExpiryUnit::Years),
            _ => None,
        }
    }

    fn code(&self) -> char {
        match self {
            ExpiryUnit::Hours => 'h',
            ExpiryUnit::Days => 'd',
            ExpiryUnit::Weeks => 'w',
            ExpiryUnit::Months => 'm',
            ExpiryUnit::Years => 'y',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelativeExpiry {
    magnitude: u32,
    unit: ExpiryUnit,
}

impl RelativeExpiry {
    pub fn new(magnitude: u32, unit: ExpiryUnit) -> Self {
        RelativeExpiry { magnitude, unit }
    }

    /// The absolute instant this expiry lands on when counted from `now`
    pub fn resolve(&self, now: OffsetDateTime) -> Result<OffsetDateTime, AuthError> {
        let n = i64::from(self.magnitude);
        let at = match self.unit {
            ExpiryUnit::Hours => now.checked_add(Duration::hours(n)),
            ExpiryUnit::Days => now.checked_add(Duration::days(n)),
            ExpiryUnit::Weeks => now.checked_add(Duration::weeks(n)),
            ExpiryUnit::Months => add_months(now, n),
            ExpiryUnit::Years => add_months(now, n * 12),
        };
        at.ok_or(AuthError::InvalidFormat)
    }
}

impl FromStr for RelativeExpiry {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((unit_at, unit_code)) = s.char_indices().last() else {
            return Err(AuthError::InvalidFormat);
        };
        let magnitude = &s[..unit_at];

        // A sign is not part of the grammar, and u32::from_str would accept a leading '+'
        if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::InvalidFormat);
        }

        Ok(RelativeExpiry {
            magnitude: magnitude.parse().map_err(|_| AuthError::InvalidFormat)?,
            unit: ExpiryUnit::from_code(unit_code).ok_or(AuthError::InvalidFormat)?,
        })
    }
}

impl Display for RelativeExpiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.code())
    }
}

/// Parses `duration` and returns the instant it denotes relative to `now`
pub fn compute_expiry(duration: &str, now: OffsetDateTime) -> Result<OffsetDateTime, AuthError> {
    duration.parse::<RelativeExpiry>()?.resolve(now)
}

// Calendar month arithmetic. A day that does not exist in the target month spills over into the
// next one, so Jan 31 plus one month is Mar 3 (or Mar 2 in a leap year).
fn add_months(now: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let date = now.date();
    let month_index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + months;

    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(month_index.rem_euclid(12) + 1).ok()?).ok()?;

    let first_of_month = Date::from_calendar_date(year, month, 1).ok()?;
    let target = first_of_month.checked_add(Duration::days(i64::from(date.day()) - 1))?;

    Some(now.replace_date(target))
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
