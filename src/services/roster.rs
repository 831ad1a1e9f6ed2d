//! Field rules shared by the vehicle and supervisor rosters.

use crate::error::AppError;

/// Longest display name accepted for vehicles and supervisors.
pub const MAX_NAME_LEN: usize = 100;

/// Longest license plate or badge number.
pub const MAX_KEY_LEN: usize = 20;

/// Trim a display name and check it is present and short enough.
pub fn normalize_name(raw: &str, field: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Normalize a unique roster key (license plate, badge number).
///
/// Keys are trimmed and upper-cased, so `abc-123` and ` ABC-123 ` collide.
pub fn normalize_key(raw: &str, field: &str) -> Result<String, AppError> {
    let key = raw.trim().to_uppercase();
    if key.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {MAX_KEY_LEN} characters"
        )));
    }
    Ok(key)
}

/// Field values after applying a partial update to a roster record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFields {
    pub name: String,
    pub key: String,
    pub is_active: bool,
}

impl RosterFields {
    /// Overlay the provided fields on the current ones, validating whatever changed.
    pub fn merge(
        current: RosterFields,
        name: Option<&str>,
        key: Option<&str>,
        is_active: Option<bool>,
        name_field: &str,
        key_field: &str,
    ) -> Result<Self, AppError> {
        Ok(Self {
            name: match name {
                Some(name) => normalize_name(name, name_field)?,
                None => current.name,
            },
            key: match key {
                Some(key) => normalize_key(key, key_field)?,
                None => current.key,
            },
            is_active: is_active.unwrap_or(current.is_active),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_uppercases_and_trims() {
        assert_eq!(normalize_key("  abc-123 ", "License plate").unwrap(), "ABC-123");
    }

    #[test]
    fn test_normalize_key_rejects_blank_and_long() {
        assert!(matches!(
            normalize_key("   ", "Badge number"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            normalize_key(&"X".repeat(MAX_KEY_LEN + 1), "Badge number"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" Patrol 1 ", "Vehicle name").unwrap(), "Patrol 1");
        assert!(normalize_name("", "Vehicle name").is_err());
        assert!(normalize_name(&"n".repeat(MAX_NAME_LEN + 1), "Vehicle name").is_err());
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let current = RosterFields {
            name: "Patrol 1".into(),
            key: "ABC-123".into(),
            is_active: true,
        };

        let merged =
            RosterFields::merge(current, None, None, Some(false), "Vehicle name", "License plate")
                .unwrap();

        assert_eq!(merged.name, "Patrol 1");
        assert_eq!(merged.key, "ABC-123");
        assert!(!merged.is_active);
    }

    #[test]
    fn test_merge_normalizes_new_key() {
        let current = RosterFields {
            name: "Sgt. Okafor".into(),
            key: "B-1".into(),
            is_active: true,
        };

        let merged =
            RosterFields::merge(current, Some("Lt. Okafor"), Some("b-2"), None, "Name", "Badge")
                .unwrap();

        assert_eq!(merged.name, "Lt. Okafor");
        assert_eq!(merged.key, "B-2");
        assert!(merged.is_active);
    }
}
