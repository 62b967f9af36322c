use thiserror::Error;

/// Errors that can occur when validating optimizer options.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{0} must be finite and non-negative")]
    Tolerance(&'static str),

    #[error("{0} must be positive")]
    ZeroLimit(&'static str),
}

pub(crate) fn check_tolerance(name: &'static str, value: f64) -> Result<(), OptionsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(OptionsError::Tolerance(name));
    }
    Ok(())
}

pub(crate) fn check_limit(name: &'static str, value: Option<usize>) -> Result<(), OptionsError> {
    if value == Some(0) {
        return Err(OptionsError::ZeroLimit(name));
    }
    Ok(())
}
