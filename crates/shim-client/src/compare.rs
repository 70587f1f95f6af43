//! # Result Comparison

use crate::errors::ComparisonError;

/// What one backend answered: output bytes or an error message.
pub type Outcome = Result<Vec<u8>, String>;

/// Compare two outcomes. Matching errors count as agreement.
pub fn compare(left: Outcome, right: Outcome) -> Result<(), ComparisonError> {
    match (left, right) {
        (Ok(left), Ok(right)) if left == right => Ok(()),
        (Ok(left), Ok(right)) => Err(ComparisonError::OkNotEqual(left, right)),
        (Err(left), Ok(right)) => Err(ComparisonError::LeftErr(left, right)),
        (Ok(left), Err(right)) => Err(ComparisonError::RightErr(left, right)),
        (Err(left), Err(right)) if left == right => Ok(()),
        (Err(left), Err(right)) => Err(ComparisonError::ErrNotEqual(left, right)),
    }
}

/// Compare outcomes where only the success/failure split and the output
/// bytes matter. Different shims word their errors differently.
pub fn compare_lenient(left: Outcome, right: Outcome) -> Result<(), ComparisonError> {
    match (left, right) {
        (Err(_), Err(_)) => Ok(()),
        (left, right) => compare(left, right),
    }
}
