/// Errors raised by registration and tick calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    /// A delay or lerp duration was negative, NaN or infinite
    #[error("{name} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { name: &'static str, value: f32 },

    /// A tick was driven with a negative, NaN or infinite delta
    #[error("{name} must be finite and non-negative (got {value})")]
    InvalidDelta { name: &'static str, value: f32 },

    /// `tick` was called from inside a flow callback
    #[error("tick() called while the scheduler is already ticking")]
    ReentrantTick,
}

pub(crate) fn check_duration(name: &'static str, value: f32) -> Result<f32, FlowError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FlowError::InvalidDuration { name, value })
    }
}

pub(crate) fn check_delta(name: &'static str, value: f32) -> Result<f32, FlowError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FlowError::InvalidDelta { name, value })
    }
}
