use thiserror::Error;

/// The only condition that aborts a whole aggregation request.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Every requested identifier was unknown or failed to construct.
    #[error("no valid provider among requested {requested:?}")]
    NoValidProvider { requested: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lists_requested_names() {
        let err = AggregateError::NoValidProvider {
            requested: vec!["doesnotexist".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "no valid provider among requested [\"doesnotexist\"]"
        );
    }
}
