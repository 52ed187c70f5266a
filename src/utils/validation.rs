use crate::utils::error::{EleganceError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number<T>(field_name: &str, value: T, min_value: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min_value {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Supported values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EleganceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_ordered<T: PartialOrd + std::fmt::Display + Copy>(
    lower_field: &str,
    lower: T,
    upper_field: &str,
    upper: T,
    strict: bool,
) -> Result<()> {
    let ok = if strict { lower < upper } else { lower <= upper };
    if !ok {
        let relation = if strict { "less than" } else { "at most" };
        return Err(EleganceError::ConfigValidationError {
            field: lower_field.to_string(),
            message: format!(
                "{} ({}) must be {} {} ({})",
                lower_field, lower, relation, upper_field, upper
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("data.root", "./data").is_ok());
        assert!(validate_path("data.root", "").is_err());
        assert!(validate_path("data.root", "a\0b").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("frames.diff", 5u32, 1).is_ok());
        assert!(validate_positive_number("frames.diff", 0u32, 1).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("data.output_format", "png", &["jpeg", "png"]).is_ok());
        let err = validate_one_of("data.output_format", "bmp", &["jpeg", "png"]).unwrap_err();
        assert!(err.to_string().contains("jpeg, png"));
    }

    #[test]
    fn test_validate_range_and_order() {
        assert!(validate_range("animation.scale", 0.5, 0.01, 1.0).is_ok());
        assert!(validate_range("animation.scale", 1.5, 0.01, 1.0).is_err());
        assert!(validate_ordered("frames.start", 1, "frames.end", 1, false).is_ok());
        assert!(
            validate_ordered("tracking.min_area", 10.0, "tracking.max_area", 10.0, true).is_err()
        );
    }
}
