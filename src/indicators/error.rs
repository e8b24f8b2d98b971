use thiserror::Error;

/// Reasons an indicator cannot produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("{indicator}: insufficient data (need {required}, have {available})")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{indicator}: period must be greater than zero")]
    InvalidPeriod { indicator: &'static str },

    #[error("{indicator}: input series have mismatched lengths")]
    LengthMismatch { indicator: &'static str },
}

impl IndicatorError {
    pub(crate) fn insufficient(indicator: &'static str, required: usize, available: usize) -> Self {
        IndicatorError::InsufficientData {
            indicator,
            required,
            available,
        }
    }
}

/// Fail with `InvalidPeriod` or `InsufficientData` before computing anything.
pub(crate) fn require(
    indicator: &'static str,
    period: u32,
    required: usize,
    available: usize,
) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator });
    }
    if available < required {
        return Err(IndicatorError::insufficient(indicator, required, available));
    }
    Ok(())
}
