use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::attributes::{cast_bool, cast_for, is_fillable, is_hidden, Cast};
use super::errors::MassAssignmentError;

/// What to do with input keys that are not on the fillable list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssignmentPolicy {
    /// Drop them and carry on.
    #[default]
    Discard,
    /// Refuse the whole assignment.
    Reject,
}

/// User record as held in memory. Serialization goes through [`User::attributes`],
/// so hidden fields never reach the output.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: Option<String>, // stored credential, hidden
    pub auth0_id: Option<String>,
    pub photo: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub email_verified: bool,
    pub remember_token: Option<String>, // hidden
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    fn blank() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            password: None,
            auth0_id: None,
            photo: None,
            country: None,
            city: None,
            email_verified: false,
            remember_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new, unsaved record from untrusted input.
    pub fn from_fillable(
        input: &Map<String, Value>,
        policy: AssignmentPolicy,
    ) -> Result<Self, MassAssignmentError> {
        let mut user = Self::blank();
        user.fill(input, policy)?;
        Ok(user)
    }

    /// Mass-assign whitelisted keys from `input`.
    ///
    /// Returns the keys that were discarded. On error the record is left untouched.
    pub fn fill(
        &mut self,
        input: &Map<String, Value>,
        policy: AssignmentPolicy,
    ) -> Result<Vec<String>, MassAssignmentError> {
        let guarded: Vec<String> = input
            .keys()
            .filter(|k| !is_fillable(k))
            .cloned()
            .collect();

        if policy == AssignmentPolicy::Reject && !guarded.is_empty() {
            return Err(MassAssignmentError::Guarded(guarded));
        }

        let mut next = self.clone();
        let mut discarded = guarded;

        for (key, value) in input.iter().filter(|(k, _)| is_fillable(k)) {
            match next.assign(key, value) {
                Ok(()) => {}
                Err(e) if policy == AssignmentPolicy::Discard => {
                    debug!(field = %key, error = %e, "discarding mistyped attribute");
                    discarded.push(key.clone());
                }
                Err(e) => return Err(e),
            }
        }

        if !discarded.is_empty() {
            debug!(user_id = %self.id, discarded = ?discarded, "mass assignment discarded keys");
        }

        *self = next;
        Ok(discarded)
    }

    fn assign(&mut self, key: &str, value: &Value) -> Result<(), MassAssignmentError> {
        if let Some(Cast::Boolean) = cast_for(key) {
            // email_verified is the only cast field
            self.email_verified = cast_bool(value);
            return Ok(());
        }

        match key {
            "name" => self.name = required_string("name", value)?,
            "email" => self.email = required_string("email", value)?,
            "password" => self.password = optional_string("password", value)?,
            "auth0_id" => self.auth0_id = optional_string("auth0_id", value)?,
            "photo" => self.photo = optional_string("photo", value)?,
            "country" => self.country = optional_string("country", value)?,
            "city" => self.city = optional_string("city", value)?,
            _ => {}
        }
        Ok(())
    }

    /// Every attribute, hidden ones included, keyed by column name.
    pub fn get_attribute(&self, field: &str) -> Option<Value> {
        let value = match field {
            "id" => Value::String(self.id.to_string()),
            "name" => Value::String(self.name.clone()),
            "email" => Value::String(self.email.clone()),
            "password" => opt(&self.password),
            "auth0_id" => opt(&self.auth0_id),
            "photo" => opt(&self.photo),
            "country" => opt(&self.country),
            "city" => opt(&self.city),
            "email_verified" => Value::Bool(self.email_verified),
            "remember_token" => opt(&self.remember_token),
            "created_at" => timestamp(self.created_at),
            "updated_at" => timestamp(self.updated_at),
            _ => return None,
        };
        Some(value)
    }

    /// The externally visible attribute map.
    pub fn attributes(&self) -> Map<String, Value> {
        COLUMNS
            .iter()
            .filter(|c| !is_hidden(c))
            .filter_map(|c| self.get_attribute(c).map(|v| ((*c).to_string(), v)))
            .collect()
    }

    pub fn has_verified_email(&self) -> bool {
        self.email_verified
    }

    pub fn mark_email_as_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = OffsetDateTime::now_utc();
    }
}

pub(crate) const COLUMNS: &[&str] = &[
    "id",
    "name",
    "email",
    "password",
    "auth0_id",
    "photo",
    "country",
    "city",
    "email_verified",
    "remember_token",
    "created_at",
    "updated_at",
];

impl Serialize for User {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes().serialize(serializer)
    }
}

fn required_string(field: &'static str, value: &Value) -> Result<String, MassAssignmentError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(MassAssignmentError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn optional_string(
    field: &'static str,
    value: &Value,
) -> Result<Option<String>, MassAssignmentError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(MassAssignmentError::InvalidType {
            field,
            expected: "a string or null",
        }),
    }
}

fn opt(v: &Option<String>) -> Value {
    v.clone().map(Value::String).unwrap_or(Value::Null)
}

/// RFC 3339 only covers years 0..=9999; anything outside serializes as null.
fn timestamp(t: OffsetDateTime) -> Value {
    match t.format(&Rfc3339) {
        Ok(s) => Value::String(s),
        Err(e) => {
            debug!(error = %e, "timestamp not representable as RFC 3339");
            Value::Null
        }
    }
}
