// GitHub DateTime values are RFC 3339, e.g. "2026-10-19T08:30:00Z".

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{ReminderError, Result};

pub fn parse_github_datetime(s: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339)
        .map_err(|e| ReminderError::DataIntegrity(format!("unparseable timestamp {s:?}: {e}")))
}
