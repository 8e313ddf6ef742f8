//! Result type alias for Object Tracker

use super::errors::TrackerError;

/// Result type alias for Object Tracker operations
///
/// # Examples
///
/// ```
/// use object_tracker::domain::result::Result;
/// use object_tracker::domain::errors::TrackerError;
///
/// fn failing_function() -> Result<()> {
///     Err(TrackerError::SchemaNotFound("HR".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<usize> {
            Ok(18)
        }

        let value = inner()?;
        assert_eq!(value, 18);
        Ok(())
    }
}
