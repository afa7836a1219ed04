//! Entity kinds, schemas and the `Entity` trait
//!
//! Every persisted type belongs to a closed set of kinds. A kind knows its
//! short type name, the log name used to partition the audit trail, its
//! ordered field schema, and whether it already has a dedicated audit logger.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::ids::{EntityId, UserId};
use crate::error::{BizdeskError, BizdeskResult};

/// Ordered field name -> value map of an entity
pub type FieldMap = serde_json::Map<String, Value>;

/// Storage type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Id,
    Text,
    Integer,
    Boolean,
    Money,
    Timestamp,
    Date,
    Reference,
    Enum,
    List,
    Object,
    /// Credential material; always masked in audit payloads
    Secret,
}

/// One field of an entity schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDef {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// The closed set of persisted entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Client,
    Product,
    Quote,
    Invoice,
    WebOrder,
    Ticket,
    /// Audit records themselves
    Activity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        Self::User,
        Self::Client,
        Self::Product,
        Self::Quote,
        Self::Invoice,
        Self::WebOrder,
        Self::Ticket,
        Self::Activity,
    ];

    /// Short type name, e.g. `WebOrder`
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Client => "Client",
            Self::Product => "Product",
            Self::Quote => "Quote",
            Self::Invoice => "Invoice",
            Self::WebOrder => "WebOrder",
            Self::Ticket => "Ticket",
            Self::Activity => "Activity",
        }
    }

    /// Audit log partition, e.g. `web_order`
    pub fn log_name(&self) -> String {
        snake_case(self.type_name())
    }

    /// Human-readable name, e.g. `Web Order`
    pub fn humanized(&self) -> String {
        headline(self.type_name())
    }

    /// Ordered field schema
    pub fn schema(&self) -> &'static [FieldDef] {
        match self {
            Self::User => super::user::USER_SCHEMA,
            Self::Client => super::client::CLIENT_SCHEMA,
            Self::Product => super::product::PRODUCT_SCHEMA,
            Self::Quote => super::quote::QUOTE_SCHEMA,
            Self::Invoice => super::invoice::INVOICE_SCHEMA,
            Self::WebOrder => super::web_order::WEB_ORDER_SCHEMA,
            Self::Ticket => super::ticket::TICKET_SCHEMA,
            Self::Activity => crate::audit::record::ACTIVITY_SCHEMA,
        }
    }

    /// Whether this kind writes its own audit trail
    ///
    /// Quotes and invoices record their document history themselves, so the
    /// generic interceptor must leave them alone.
    pub fn has_dedicated_audit(&self) -> bool {
        matches!(self, Self::Quote | Self::Invoice)
    }

    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.schema().iter().find(|f| f.name == name)
    }

    /// Parse a kind from its type name or log name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| {
            kind.type_name().to_lowercase() == needle || kind.log_name() == needle
        })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Polymorphic reference to a persisted entity (relation + lookup, no ownership)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub key: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, key: Uuid) -> Self {
        Self { kind, key }
    }

    pub fn of<E: Entity>(entity: &E) -> Self {
        Self::new(E::KIND, entity.key())
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key.to_string();
        write!(f, "{} {}", self.kind, &key[..8])
    }
}

/// A persisted domain type
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    type Id: EntityId;

    fn id(&self) -> Self::Id;

    /// UUID used as the polymorphic subject/causer id
    fn key(&self) -> Uuid;

    /// Short label for messages (name, number, ...)
    fn label(&self) -> String;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);

    /// Stamp update bookkeeping (updated_at, and updated_by where present)
    fn touch(&mut self, at: DateTime<Utc>, by: Option<UserId>);

    fn is_trashed(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Field map in schema order
    fn attributes(&self) -> BizdeskResult<FieldMap> {
        schema_ordered(Self::KIND, serde_json::to_value(self)?)
    }
}

/// Project a serialized entity onto its kind's schema
///
/// Fields missing from the serialized form become `null`; serialized keys
/// that are not in the schema are dropped.
pub fn schema_ordered(kind: EntityKind, value: Value) -> BizdeskResult<FieldMap> {
    let Value::Object(mut object) = value else {
        return Err(BizdeskError::Json(format!(
            "{} did not serialize to an object",
            kind
        )));
    };

    let mut map = FieldMap::new();
    for field in kind.schema() {
        let value = object.remove(field.name).unwrap_or(Value::Null);
        map.insert(field.name.to_string(), value);
    }
    Ok(map)
}

/// `WebOrder` -> `web_order`, `HTTPRequest` -> `http_request`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    out.push('_');
                }
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// `WebOrder` -> `Web Order`, `web_order` -> `Web Order`
pub fn headline(name: &str) -> String {
    snake_case(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("WebOrder"), "web_order");
        assert_eq!(snake_case("Client"), "client");
        assert_eq!(snake_case("HTTPRequest"), "http_request");
        assert_eq!(snake_case("Invoice2Line"), "invoice2_line");
    }

    #[test]
    fn test_headline() {
        assert_eq!(headline("WebOrder"), "Web Order");
        assert_eq!(headline("web_order"), "Web Order");
        assert_eq!(headline("Ticket"), "Ticket");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::WebOrder.log_name(), "web_order");
        assert_eq!(EntityKind::WebOrder.humanized(), "Web Order");
        assert_eq!(EntityKind::Client.to_string(), "Client");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(EntityKind::parse("web_order"), Some(EntityKind::WebOrder));
        assert_eq!(EntityKind::parse("WebOrder"), Some(EntityKind::WebOrder));
        assert_eq!(EntityKind::parse("CLIENT"), Some(EntityKind::Client));
        assert_eq!(EntityKind::parse("widget"), None);
    }

    #[test]
    fn test_dedicated_audit_flags() {
        let dedicated: Vec<_> = EntityKind::ALL
            .into_iter()
            .filter(|k| k.has_dedicated_audit())
            .collect();
        assert_eq!(dedicated, vec![EntityKind::Quote, EntityKind::Invoice]);
    }

    #[test]
    fn test_every_schema_has_id_and_no_duplicates() {
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema[0].name, "id", "{} schema must start with id", kind);
            let mut names: Vec<_> = schema.iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.len(), "{} has duplicate fields", kind);
        }
    }

    #[test]
    fn test_schema_ordered_fills_missing_with_null() {
        let value = serde_json::json!({"email": "a@x.com", "id": "x", "extra": 1});
        let map = schema_ordered(EntityKind::Client, value).unwrap();

        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        let expected: Vec<_> = EntityKind::Client.schema().iter().map(|f| f.name).collect();
        assert_eq!(keys, expected);
        assert_eq!(map["email"], "a@x.com");
        assert_eq!(map["phone"], Value::Null);
        assert!(!map.contains_key("extra"));
    }

    #[test]
    fn test_schema_ordered_rejects_non_objects() {
        assert!(schema_ordered(EntityKind::Client, Value::Bool(true)).is_err());
    }
}
