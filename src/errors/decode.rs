use axum::http::StatusCode;
use serde_json::Value;

use super::codes::ErrorKind;
use super::response::ErrorEnvelope;
use super::service::ServiceError;

impl ErrorEnvelope {
    /// Read an envelope out of a raw response body.
    ///
    /// Never fails. A body that is not a JSON object yields the raw text as
    /// `detail` and an `Unknown` kind.
    pub fn from_body(body: &str) -> Self {
        let object = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(object)) => object,
            _ => return Self::new(ErrorKind::Unknown, body),
        };

        let detail = match object.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let exception_type = match object.get("exception_type") {
            Some(Value::String(s)) => ErrorKind::from_wire(s),
            _ => ErrorKind::Unknown,
        };

        Self::new(exception_type, detail)
    }
}

/// Decode a response into `Ok(())` for 2xx, or the error it carries.
///
/// The status code picks the error; `exception_type` only disambiguates
/// between kinds that share a status.
pub fn decode(status: StatusCode, body: &str) -> Result<(), ServiceError> {
    if status.is_success() {
        return Ok(());
    }

    Err(decode_error(status, body))
}

/// Classify a non-success response. Callers check the status first; a 2xx
/// passed here is treated like any other unexpected status.
pub fn decode_error(status: StatusCode, body: &str) -> ServiceError {
    let ErrorEnvelope {
        detail,
        exception_type,
    } = ErrorEnvelope::from_body(body);

    match status.as_u16() {
        403 => ServiceError::PermissionDenied(detail),
        404 => ServiceError::NotFound(detail),
        409 => match exception_type {
            ErrorKind::Preempted => ServiceError::Preempted(detail),
            _ => ServiceError::StateConflict(detail),
        },
        // validation and unknown both collapse to InvalidValue here
        422 => match exception_type {
            ErrorKind::IndexError => ServiceError::IndexOutOfRange(detail),
            ErrorKind::KeyError => ServiceError::KeyLookup(detail),
            _ => ServiceError::InvalidValue(detail),
        },
        500 => ServiceError::Runtime(detail),
        504 => ServiceError::Timeout(detail),
        _ => ServiceError::Runtime(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::response::encode;

    fn round_trip(err: &ServiceError) -> ServiceError {
        let (status, envelope) = encode(err);
        let body = serde_json::to_string(&envelope).unwrap();
        decode(status, &body).unwrap_err()
    }

    #[test]
    fn test_success_passes_regardless_of_body() {
        assert_eq!(decode(StatusCode::OK, "not json at all"), Ok(()));
        assert_eq!(decode(StatusCode::CREATED, r#"{"detail":"x"}"#), Ok(()));
        assert_eq!(decode(StatusCode::NO_CONTENT, ""), Ok(()));
    }

    #[test]
    fn test_key_error_on_422() {
        let err = decode(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"bad field","exception_type":"key_error"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::KeyLookup("bad field".to_string()));
    }

    #[test]
    fn test_malformed_body_on_500() {
        let err = decode(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").unwrap_err();
        assert_eq!(err, ServiceError::Runtime("<html>oops</html>".to_string()));
    }

    #[test]
    fn test_non_object_json_uses_raw_text() {
        let err = decode(StatusCode::UNPROCESSABLE_ENTITY, r#"["a","b"]"#).unwrap_err();
        assert_eq!(err, ServiceError::InvalidValue(r#"["a","b"]"#.to_string()));
    }

    #[test]
    fn test_missing_fields() {
        let err = decode(StatusCode::CONFLICT, "{}").unwrap_err();
        assert_eq!(err, ServiceError::StateConflict(String::new()));
    }

    #[test]
    fn test_null_detail_is_empty() {
        let err = decode(
            StatusCode::NOT_FOUND,
            r#"{"detail":null,"exception_type":"not_found_exception"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::NotFound(String::new()));
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let envelope = ErrorEnvelope::from_body(
            r#"{"detail":[{"loc":["body","x"],"msg":"field required"}],"exception_type":"request_validation_error"}"#,
        );
        assert_eq!(envelope.exception_type, ErrorKind::ValidationError);
        assert!(envelope.detail.contains("field required"));
    }

    #[test]
    fn test_preempted_on_409() {
        let err = decode(
            StatusCode::CONFLICT,
            r#"{"detail":"cancelled","exception_type":"preempted_exception"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::Preempted("cancelled".to_string()));
    }

    #[test]
    fn test_409_with_unrelated_kind_is_state_conflict() {
        let err = decode(
            StatusCode::CONFLICT,
            r#"{"detail":"x","exception_type":"index_error"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::StateConflict("x".to_string()));
    }

    #[test]
    fn test_unrecognized_kind_on_422_is_invalid_value() {
        let err = decode(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"x","exception_type":"brand_new_error"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::InvalidValue("x".to_string()));
    }

    #[test]
    fn test_other_statuses_are_runtime() {
        for code in [400u16, 401, 418, 429, 502, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = decode(status, r#"{"detail":"nope"}"#).unwrap_err();
            assert_eq!(err, ServiceError::Runtime("nope".to_string()), "{}", code);
        }
    }

    #[test]
    fn test_round_trip_preserves_observable_class() {
        let m = "something happened".to_string();
        let cases = [
            (ServiceError::KeyLookup(m.clone()), ServiceError::KeyLookup(m.clone())),
            (ServiceError::InvalidValue(m.clone()), ServiceError::InvalidValue(m.clone())),
            (ServiceError::IndexOutOfRange(m.clone()), ServiceError::IndexOutOfRange(m.clone())),
            (ServiceError::Validation(m.clone()), ServiceError::InvalidValue(m.clone())),
            (ServiceError::PermissionDenied(m.clone()), ServiceError::PermissionDenied(m.clone())),
            (ServiceError::NotFound(m.clone()), ServiceError::NotFound(m.clone())),
            (ServiceError::Preempted(m.clone()), ServiceError::Preempted(m.clone())),
            (ServiceError::StateConflict(m.clone()), ServiceError::StateConflict(m.clone())),
            (ServiceError::Timeout(m.clone()), ServiceError::Timeout(m.clone())),
            (ServiceError::Runtime(m.clone()), ServiceError::Runtime(m.clone())),
            (ServiceError::Unknown(m.clone()), ServiceError::Runtime(m.clone())),
        ];

        for (sent, expected) in cases {
            assert_eq!(round_trip(&sent), expected, "{:?}", sent);
        }
    }

    #[test]
    fn test_not_found_round_trip_keeps_item_name() {
        let err = round_trip(&ServiceError::not_found("widget-42", ""));
        assert!(matches!(&err, ServiceError::NotFound(m) if m.contains("widget-42")));
    }
}
