use crate::utils::error::{ProviderError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProviderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ProviderError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ProviderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ProviderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ProviderError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProviderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of<T: PartialEq + std::fmt::Display>(
    field_name: &str,
    value: T,
    allowed: &[T],
) -> Result<()> {
    if !allowed.contains(&value) {
        let allowed = allowed
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ProviderError::SchemaError {
            attribute: field_name.to_string(),
            message: format!("expected one of [{}], got {}", allowed, value),
        });
    }
    Ok(())
}

/// 互斥的識別欄位中必須恰好設定一個
pub fn validate_exactly_one(fields: &[&str], set_count: usize) -> Result<()> {
    if set_count != 1 {
        let quoted = fields
            .iter()
            .map(|f| format!("{:?}", f))
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(ProviderError::InvalidInputError {
            message: format!("One of {} has to be provided", quoted),
        });
    }
    Ok(())
}
