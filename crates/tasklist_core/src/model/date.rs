use crate::error::AppError;
use time::Date;
use time::macros::format_description;

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_due_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("due date is required"));
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD"))
}

pub fn format_due_date(date: Date) -> Result<String, AppError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Serde adapter for `Option<Date>` stored as `YYYY-MM-DD`.
///
/// Blank strings and `null` both read back as no due date.
pub(crate) mod optional_calendar_date {
    use super::{format_due_date, parse_due_date};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(
        value: &Option<Date>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => {
                let formatted =
                    format_due_date(*date).map_err(<S::Error as serde::ser::Error>::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_due_date(value)
                .map(Some)
                .map_err(<D::Error as serde::de::Error>::custom),
        }
    }
}
