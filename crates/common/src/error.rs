/// A tunable outside its accepted range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid `{field}`: {reason}")]
pub struct InvalidParam {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidParam {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Fail with [`InvalidParam`] unless `value` is finite.
pub fn ensure_finite(field: &'static str, value: f32) -> Result<(), InvalidParam> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidParam::new(
            field,
            format!("must be finite, got {value}"),
        ))
    }
}

/// Fail unless `value` is finite and strictly positive.
pub fn ensure_positive(field: &'static str, value: f32) -> Result<(), InvalidParam> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(InvalidParam::new(
            field,
            format!("must be > 0, got {value}"),
        ))
    }
}
