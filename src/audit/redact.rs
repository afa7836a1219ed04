//! Masking of credential fields in audit payloads

use serde_json::Value;

use crate::models::FieldMap;

/// Placeholder written instead of a sensitive value
pub const REDACTED: &str = "********";

/// Field names never stored in clear text, whatever the entity kind
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "password_confirmation",
    "remember_token",
    "current_password",
    "new_password",
    "two_factor_secret",
    "two_factor_recovery_codes",
];

pub fn is_sensitive(field: &str) -> bool {
    SENSITIVE_FIELDS.contains(&field)
}

/// Replace every deny-listed value present in `map` with [`REDACTED`]
///
/// Keys absent from the map stay absent.
pub fn redact(mut map: FieldMap) -> FieldMap {
    for (key, value) in map.iter_mut() {
        if is_sensitive(key) {
            *value = Value::String(REDACTED.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, FieldType};
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_masks_sensitive_values() {
        let redacted = redact(map(json!({
            "name": "Ada",
            "password": "$argon2id$...",
            "two_factor_recovery_codes": ["a", "b"],
        })));

        assert_eq!(redacted["name"], "Ada");
        assert_eq!(redacted["password"], REDACTED);
        assert_eq!(redacted["two_factor_recovery_codes"], REDACTED);
    }

    #[test]
    fn test_does_not_inject_keys() {
        let redacted = redact(map(json!({"email": "a@x.com"})));
        assert_eq!(redacted.len(), 1);
        assert!(!redacted.contains_key("password"));
    }

    #[test]
    fn test_masks_null_secrets_too() {
        let redacted = redact(map(json!({"remember_token": null})));
        assert_eq!(redacted["remember_token"], REDACTED);
    }

    #[test]
    fn test_secret_schema_fields_are_deny_listed() {
        for kind in EntityKind::ALL {
            for field in kind.schema() {
                if field.ty == FieldType::Secret {
                    assert!(
                        is_sensitive(field.name),
                        "{}.{} is a secret but not masked",
                        kind,
                        field.name
                    );
                }
                if is_sensitive(field.name) {
                    assert_eq!(
                        field.ty,
                        FieldType::Secret,
                        "{}.{} is masked but not typed Secret",
                        kind,
                        field.name
                    );
                }
            }
        }
    }
}
