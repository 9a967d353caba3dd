//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` [`Error`] whose first `errors`
//! entry is the human message and whose `details` name the offending field.

use crate::domain::{
    Error, Level, NOT_FOUND_MESSAGE, RecordName, RecordValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    Required,
    Blank,
    Invalid,
    MaxLength,
    MinValue,
    MaxValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::Blank => "blank",
            ErrorCode::Invalid => "invalid",
            ErrorCode::MaxLength => "max_length",
            ErrorCode::MinValue => "min_value",
            ErrorCode::MaxValue => "max_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_field(field.as_str(), code.as_str(), message)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(field, ErrorCode::Required, "This field is required.")
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn user_field_error(field: FieldName, err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyEmail | UserValidationError::EmptyName => ErrorCode::Blank,
        UserValidationError::EmailTooLong { .. } | UserValidationError::NameTooLong { .. } => {
            ErrorCode::MaxLength
        }
        UserValidationError::InvalidId | UserValidationError::InvalidEmail => ErrorCode::Invalid,
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn record_field_error(field: FieldName, err: RecordValidationError) -> Error {
    let code = match &err {
        RecordValidationError::EmptyName => ErrorCode::Blank,
        RecordValidationError::NameTooLong { .. } => ErrorCode::MaxLength,
        RecordValidationError::LevelOutOfRange { value } if *value < 1 => ErrorCode::MinValue,
        RecordValidationError::LevelOutOfRange { .. }
        | RecordValidationError::SoilMoistureOutOfRange { .. } => ErrorCode::MaxValue,
        RecordValidationError::NegativeTelemetry { .. } => ErrorCode::MinValue,
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn parse_record_name(raw: &str, field: FieldName) -> Result<RecordName, Error> {
    RecordName::new(raw).map_err(|err| record_field_error(field, err))
}

pub(crate) fn parse_level(raw: i64, field: FieldName) -> Result<Level, Error> {
    Level::new(raw).map_err(|err| record_field_error(field, err))
}

/// Parse a record id from a path segment; anything unparsable is a miss.
pub(crate) fn parse_path_id<T>(raw: &str, parse: impl FnOnce(&str) -> Option<T>) -> Result<T, Error> {
    parse(raw).ok_or_else(|| Error::not_found(NOT_FOUND_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as ApiErrorCode, GardenId};
    use rstest::rstest;
    use serde_json::json;

    const NAME: FieldName = FieldName::new("name");

    #[test]
    fn missing_fields_name_the_field() {
        let err = missing_field_error(NAME);
        assert_eq!(err.code(), ApiErrorCode::InvalidRequest);
        assert_eq!(err.errors()[0], "This field is required.");
        assert_eq!(
            err.details(),
            Some(&json!({"field": "name", "code": "required"}))
        );
    }

    #[rstest]
    #[case(0, "min_value")]
    #[case(4, "max_value")]
    fn level_errors_report_the_bound(#[case] raw: i64, #[case] code: &str) {
        let err = parse_level(raw, FieldName::new("level")).expect_err("out of range");
        assert_eq!(err.details(), Some(&json!({"field": "level", "code": code})));
    }

    #[rstest]
    #[case("7", true)]
    #[case("abc", false)]
    #[case("-1", false)]
    fn path_ids_that_do_not_parse_are_not_found(#[case] raw: &str, #[case] ok: bool) {
        let result = parse_path_id(raw, GardenId::parse);
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.code(), ApiErrorCode::NotFound);
        }
    }
}
