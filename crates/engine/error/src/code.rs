#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // Operation preparation phases
    OperationParsingError,
    OperationValidationError,
    OperationSelectionError,
    VariableError,
    InputDepthExceeded,
    // Runtime
    FieldError,
    InternalServerError,
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn codes_are_screaming_snake_case() {
        assert_eq!(ErrorCode::OperationValidationError.to_string(), "OPERATION_VALIDATION_ERROR");
        assert_eq!(ErrorCode::InputDepthExceeded.as_ref(), "INPUT_DEPTH_EXCEEDED");
        assert_eq!(
            serde_json::to_value(ErrorCode::FieldError).unwrap(),
            serde_json::json!("FIELD_ERROR")
        );
    }
}
