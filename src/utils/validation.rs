use crate::utils::error::{CheckinError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CheckinError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CheckinError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CheckinError::InvalidConfigValueError {
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
        return Err(CheckinError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Returns the lowercased extension of `file_name` if it is one of `allowed_extensions`.
///
/// `Ok(None)` means the name carries no extension at all, which callers treat
/// as "decide from the content instead".
pub fn validate_file_extension(
    file_name: &str,
    allowed_extensions: &[&str],
) -> Result<Option<String>> {
    let Some(extension) = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    else {
        return Ok(None);
    };

    if allowed_extensions.contains(&extension.as_str()) {
        Ok(Some(extension))
    } else {
        Err(CheckinError::UnsupportedFormat {
            file_name: format!(
                "{} (allowed extensions: {})",
                file_name,
                allowed_extensions.join(", ")
            ),
        })
    }
}
