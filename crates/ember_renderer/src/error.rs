//! Construction-time errors.
//!
//! Nothing on the per-ray path can fail; these only come out of scene, camera
//! and configuration setup, or out of writing the finished image.

use thiserror::Error;

/// Errors raised while setting up or saving a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot build a BVH over an empty primitive list")]
    EmptyScene,

    #[error("Invalid time interval [{start}, {end}]")]
    InvalidTimeInterval { start: f64, end: f64 },

    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Invalid camera settings: {0}")]
    InvalidCamera(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Check that `[start, end]` is a finite, non-inverted time window.
pub(crate) fn check_time_interval(start: f64, end: f64) -> RenderResult<()> {
    if start.is_finite() && end.is_finite() && start <= end {
        Ok(())
    } else {
        Err(RenderError::InvalidTimeInterval { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_time_interval() {
        assert!(check_time_interval(0.0, 1.0).is_ok());
        assert!(check_time_interval(0.5, 0.5).is_ok());
        assert!(matches!(
            check_time_interval(1.0, 0.0),
            Err(RenderError::InvalidTimeInterval { start, end }) if start == 1.0 && end == 0.0
        ));
        assert!(check_time_interval(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = RenderError::InvalidTimeInterval { start: 1.0, end: 0.0 };
        assert_eq!(err.to_string(), "Invalid time interval [1, 0]");
        assert_eq!(
            RenderError::EmptyScene.to_string(),
            "Cannot build a BVH over an empty primitive list"
        );
    }
}
