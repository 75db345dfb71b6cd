use crate::error::AuthError;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

//--------------------------------------------------------------------------------------------------
// RFC 3339 timestamps at second precision
//--------------------------------------------------------------------------------------------------

/// Expiry instant as carried in a token. Sub-second precision is dropped so the rendered form is
/// always `YYYY-MM-DDTHH:MM:SS` followed by an explicit offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ExpiryTimestamp(OffsetDateTime);

impl ExpiryTimestamp {
    pub(crate) fn new(at: OffsetDateTime) -> Self {
        ExpiryTimestamp(at.replace_nanosecond(0).unwrap_or(at))
    }

    pub(crate) fn parse(s: &str) -> Result<Self, AuthError> {
        OffsetDateTime::parse(s, &Rfc3339)
            .map(ExpiryTimestamp)
            .map_err(|_| AuthError::MalformedToken)
    }

    pub(crate) fn format(&self) -> Result<String, AuthError> {
        // Only fails for years outside 0..=9999, which RFC 3339 cannot express
        self.0.format(&Rfc3339).map_err(|_| AuthError::InvalidFormat)
    }

    pub(crate) fn has_passed(&self, now: OffsetDateTime) -> bool {
        self.0 <= now
    }
}

impl From<ExpiryTimestamp> for OffsetDateTime {
    fn from(ts: ExpiryTimestamp) -> Self {
        ts.0
    }
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_at_second_precision_with_offset() {
        let ts = ExpiryTimestamp::new(datetime!(2023-09-16 23:03:52.750 +05:30));
        assert_eq!(ts.format().unwrap(), "2023-09-16T23:03:52+05:30");

        let utc = ExpiryTimestamp::new(datetime!(2024-01-02 03:04:05 UTC));
        assert_eq!(utc.format().unwrap(), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn parses_what_it_formats() {
        let ts = ExpiryTimestamp::new(datetime!(2023-09-16 23:03:52 +05:30));
        assert_eq!(ExpiryTimestamp::parse(&ts.format().unwrap()).unwrap(), ts);
        assert_eq!(
            ExpiryTimestamp::parse("2023-09-16 23:03:52"),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn expiry_is_inclusive_of_now() {
        let now = datetime!(2024-01-01 00:00:00 UTC);
        assert!(ExpiryTimestamp::new(now).has_passed(now));
        assert!(!ExpiryTimestamp::new(now + time::Duration::seconds(1)).has_passed(now));
    }
}

//--------------------------------------------------------------------------------------------------
