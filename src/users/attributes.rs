use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::Value;

/// Fields that may be populated from untrusted input in one bulk operation.
pub const FILLABLE: &[&str] = &[
    "name",
    "email",
    "password",
    "auth0_id",
    "photo",
    "country",
    "city",
    "email_verified",
];

/// Fields that never leave the process in serialized form.
pub const HIDDEN: &[&str] = &["password", "remember_token"];

/// Declared conversion applied when a field is read from storage or input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    Boolean,
}

lazy_static! {
    static ref CASTS: HashMap<&'static str, Cast> = {
        let mut m = HashMap::new();
        m.insert("email_verified", Cast::Boolean);
        m
    };
}

pub fn is_fillable(field: &str) -> bool {
    FILLABLE.contains(&field)
}

pub fn is_hidden(field: &str) -> bool {
    HIDDEN.contains(&field)
}

pub fn cast_for(field: &str) -> Option<Cast> {
    CASTS.get(field).copied()
}

/// Truthiness coercion for boolean-cast fields. Never fails.
pub fn cast_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Storage side of the boolean cast (`SMALLINT` column).
pub fn bool_from_storage(raw: i16) -> bool {
    raw != 0
}

pub fn bool_to_storage(value: bool) -> i16 {
    i16::from(value)
}
