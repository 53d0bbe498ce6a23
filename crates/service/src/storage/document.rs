//! On-disk document shape.
//!
//! The whole datastore is one JSON object with four arrays. Record ids are
//! normalized to `u64` while reading so that `"7"` and `7` address the same
//! record. Entries this service cannot make sense of are carried through
//! reads and writes untouched; they are just never addressable.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The three free-form record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Employees,
    Customers,
    Services,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Employees, Collection::Customers, Collection::Services];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Employees => "employees",
            Collection::Customers => "customers",
            Collection::Services => "services",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field bag supplied by clients on create/update.
pub type Fields = Map<String, Value>;

/// A free-form record: an integer id plus whatever fields the client sent.
///
/// `id` is `None` when the stored value is missing or not a non-negative
/// integer. The raw value then stays in `fields` and is written back as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Fields", into = "Fields")]
pub struct Record {
    pub id: Option<u64>,
    pub fields: Fields,
}

impl From<Fields> for Record {
    fn from(mut fields: Fields) -> Self {
        let id = fields.get("id").and_then(numeric_id);
        if id.is_some() {
            fields.remove("id");
        }
        Self { id, fields }
    }
}

impl From<Record> for Fields {
    fn from(rec: Record) -> Self {
        let mut out = rec.fields;
        if let Some(id) = rec.id {
            out.insert("id".into(), Value::from(id));
        }
        out
    }
}

impl Record {
    /// Build a record from client fields; an `id` key in `fields` never survives.
    pub fn new(id: u64, mut fields: Fields) -> Self {
        fields.remove("id");
        Self { id: Some(id), fields }
    }

    /// Shallow merge: supplied keys overwrite, everything else stays. The id is fixed.
    pub fn merge(&mut self, mut fields: Fields) {
        fields.remove("id");
        for (k, v) in fields {
            self.fields.insert(k, v);
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

/// Authentication principal as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
    /// RFC 3339 for users created here; older files may hold other formats.
    #[serde(default)]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Fields,
}

/// One element of the `users` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserEntry {
    Valid(User),
    /// Kept verbatim; cannot log in and takes no part in uniqueness checks.
    Unreadable(Value),
}

impl UserEntry {
    pub fn user(&self) -> Option<&User> {
        match self {
            UserEntry::Valid(u) => Some(u),
            UserEntry::Unreadable(_) => None,
        }
    }

    fn id(&self) -> Option<u64> {
        match self {
            UserEntry::Valid(u) => Some(u.id),
            UserEntry::Unreadable(raw) => raw.get("id").and_then(numeric_id),
        }
    }
}

/// Input for [`crate::storage::json_document_store::DocumentStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub employees: Vec<Record>,
    #[serde(default)]
    pub customers: Vec<Record>,
    #[serde(default)]
    pub services: Vec<Record>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl Document {
    pub fn collection(&self, c: Collection) -> &Vec<Record> {
        match c {
            Collection::Employees => &self.employees,
            Collection::Customers => &self.customers,
            Collection::Services => &self.services,
        }
    }

    pub fn collection_mut(&mut self, c: Collection) -> &mut Vec<Record> {
        match c {
            Collection::Employees => &mut self.employees,
            Collection::Customers => &mut self.customers,
            Collection::Services => &mut self.services,
        }
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter_map(UserEntry::user)
    }

    pub fn next_record_id(&self, c: Collection) -> u64 {
        next_id(self.collection(c).iter().filter_map(|r| r.id))
    }

    pub fn next_user_id(&self) -> u64 {
        next_id(self.users.iter().filter_map(UserEntry::id))
    }
}

/// `max(ids) + 1`, or 1 for an empty slice. Order of `ids` does not matter.
pub fn next_id<I: IntoIterator<Item = u64>>(ids: I) -> u64 {
    ids.into_iter().max().map_or(1, |m| m + 1)
}

/// Non-negative integer ids, as numbers (`7`, `7.0`) or numeric strings (`"7"`).
fn numeric_id(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn loose_id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(0),
        other => numeric_id(&other).ok_or_else(|| de::Error::custom(format!("invalid id: {other}"))),
    }
}
