use tracing::warn;
use uuid::Uuid;

/// Deterministic identifier for a reference the schema could not resolve.
///
/// The same `table`/`field` pair always yields the same identifier, so
/// repeated mappings of an unresolved query are reproducible.
pub fn placeholder_id(prefix: &str, table: &str, field: Option<&str>) -> String {
    let key = match field {
        Some(field) => format!("{}.{}", table.trim(), field.trim()),
        None => table.trim().to_string(),
    }
    .to_lowercase();

    let id = format!("{prefix}{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()));
    warn!(reference = key.as_str(), id = id.as_str(), "unresolved schema reference, using placeholder id");
    id
}

pub fn is_placeholder(prefix: &str, id: &str) -> bool {
    id.strip_prefix(prefix).is_some_and(|rest| Uuid::parse_str(rest).is_ok())
}

#[cfg(test)]
mod tests {
    use crate::schema::{is_placeholder, placeholder_id};

    #[test]
    pub fn test_placeholder_is_deterministic() {
        let first = placeholder_id("ph-", "Employee", Some("Name"));
        let second = placeholder_id("ph-", "employee", Some("NAME"));

        assert_eq!(first, second);
        assert!(first.starts_with("ph-"));
        assert!(is_placeholder("ph-", &first));
    }

    #[test]
    pub fn test_placeholder_differs_per_reference() {
        let field = placeholder_id("ph-", "Employee", Some("Name"));
        let table = placeholder_id("ph-", "Employee", None);

        assert_ne!(field, table);
        assert!(!is_placeholder("ph-", "fld-1"));
    }
}
