//! Mapping from domain validation failures to `400` payloads.
//!
//! Every form or query failure carries `details { field, code }` so clients
//! can highlight the offending input.

use crate::domain::{
    BlogValidationError, CredentialsValidationError, Error, FeedQueryError, ImageValidationError,
    UserValidationError,
};

/// A validation failure tied to one named input.
pub(crate) trait FieldViolation: std::fmt::Display {
    fn field(&self) -> &str;
    fn code(&self) -> &str;
}

pub(crate) fn violation_error(violation: &impl FieldViolation) -> Error {
    Error::invalid_field(violation.field(), violation.code(), violation.to_string())
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_field(field, "missing_field", format!("missing required field: {field}"))
}

/// Image failures do not know which form part carried the file.
pub(crate) fn image_error(field: &str, error: &ImageValidationError) -> Error {
    Error::invalid_field(field, error.code(), error.to_string())
}

macro_rules! field_violation {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldViolation for $ty {
                fn field(&self) -> &str {
                    <$ty>::field(self)
                }

                fn code(&self) -> &str {
                    <$ty>::code(self)
                }
            }

            impl From<$ty> for Error {
                fn from(error: $ty) -> Self {
                    violation_error(&error)
                }
            }
        )+
    };
}

field_violation!(
    UserValidationError,
    BlogValidationError,
    CredentialsValidationError,
    FeedQueryError,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, UserId};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn user_errors_name_their_field() {
        let err: Error = UserId::new("nope").expect_err("invalid id").into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "id", "code": "invalid_id" }))
        );
    }

    #[rstest]
    #[case(FeedQueryError::InvalidPage, "page", "invalid_page")]
    #[case(FeedQueryError::UnknownSort, "sort", "invalid_sort")]
    fn feed_errors_name_their_field(
        #[case] error: FeedQueryError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let err = Error::from(error);
        assert_eq!(err.details(), Some(&json!({ "field": field, "code": code })));
    }

    #[rstest]
    fn image_errors_use_the_supplied_field() {
        let err = image_error("photo", &ImageValidationError::ContentMismatch);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "photo", "code": "image_content_mismatch" }))
        );
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let err = missing_field_error("title");
        assert_eq!(err.message(), "missing required field: title");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "title", "code": "missing_field" }))
        );
    }
}
