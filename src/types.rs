//! Core data model types.
//!
//! A [`Record`] is an ordered map from field code to [`FieldValue`]. Field values are dispatched
//! on their `"type"` tag into the kinds this crate works with ([`Subtable`] and [`UserSelect`]);
//! anything else is kept as [`FieldValue::Other`] and written back exactly as it was read.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{FlattenError, FlattenResult};

/// Type tag of a grouped (sub-table) field.
pub const SUBTABLE: &str = "SUBTABLE";
/// Type tag of a user-selection field.
pub const USER_SELECT: &str = "USER_SELECT";

const TYPE_KEY: &str = "type";
const VALUE_KEY: &str = "value";
const ID_KEY: &str = "id";
const CODE_KEY: &str = "code";
const NAME_KEY: &str = "name";

/// Every key of a field value except `value` (the `type` tag included), in original order.
pub type Attributes = Map<String, Value>;

/// A reference to a user inside a [`UserSelect`].
///
/// Decoding keeps exactly the keys that were read, so an entity that is not rewritten serializes
/// back to the same JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEntity {
    /// Identifying key, if the entity has one.
    pub code: Option<String>,
    /// Display name as read (any JSON value, `null` included). Never consulted by the engine.
    pub name: Option<Value>,
    /// Any other keys present on the entity.
    pub extra: Map<String, Value>,
}

impl UserEntity {
    /// Create an entity carrying only a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: None,
            extra: Map::new(),
        }
    }

    /// The entity's code, or `""` when it has none.
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    /// Decode an entity. Returns `None` unless `value` is an object whose `code`, when present,
    /// is a string.
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };

        let mut entity = Self {
            code: None,
            name: None,
            extra: Map::new(),
        };
        for (key, v) in map {
            if key == CODE_KEY {
                match v {
                    Value::String(code) => entity.code = Some(code),
                    _ => return None,
                }
            } else if key == NAME_KEY {
                entity.name = Some(v);
            } else {
                entity.extra.insert(key, v);
            }
        }
        Some(entity)
    }

    /// Serialize the entity, emitting only the keys it carries.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(code) = &self.code {
            map.insert(CODE_KEY.to_string(), Value::String(code.clone()));
        }
        if let Some(name) = &self.name {
            map.insert(NAME_KEY.to_string(), name.clone());
        }
        for (key, value) in &self.extra {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(map)
    }
}

/// A `USER_SELECT` field value.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSelect {
    /// Selected users, in order.
    pub entities: Vec<UserEntity>,
    /// Non-`value` attributes of the field.
    pub attributes: Attributes,
}

impl UserSelect {
    /// Create a user selection tagged `USER_SELECT`.
    pub fn new(entities: Vec<UserEntity>) -> Self {
        Self {
            entities,
            attributes: tag_only(USER_SELECT),
        }
    }

    /// Iterate entity codes in order (empty codes included).
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(UserEntity::code)
    }
}

/// One row of a [`Subtable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A row whose `value` is a mapping of column code to field value.
    Cells {
        /// Row identifier, when present as a string.
        id: Option<String>,
        /// Column code → cell value.
        value: IndexMap<String, FieldValue>,
        /// Any other keys of the row object.
        extra: Map<String, Value>,
    },
    /// Anything that is not a JSON object with an object `value`. Carried through, never read.
    Opaque(Value),
}

impl Row {
    /// Create a well-formed row.
    pub fn new<I, K>(id: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        Self::Cells {
            id: Some(id.into()),
            value: cells.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            extra: Map::new(),
        }
    }

    /// Decode a row from JSON. Rows without an object `value` become [`Row::Opaque`].
    pub fn from_json(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Opaque(value);
        };
        if !map.get(VALUE_KEY).is_some_and(Value::is_object) {
            return Self::Opaque(Value::Object(map));
        }

        let mut id = None;
        let mut cells = IndexMap::new();
        let mut extra = Map::new();
        for (key, v) in map {
            if key == VALUE_KEY {
                if let Value::Object(columns) = v {
                    cells = columns
                        .into_iter()
                        .map(|(column, cell)| (column, FieldValue::from_json(cell)))
                        .collect();
                }
            } else if key == ID_KEY && v.is_string() {
                id = v.as_str().map(str::to_owned);
            } else {
                extra.insert(key, v);
            }
        }

        Self::Cells {
            id,
            value: cells,
            extra,
        }
    }

    /// Serialize the row.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Cells { id, value, extra } => {
                let mut map = Map::new();
                if let Some(id) = id {
                    map.insert(ID_KEY.to_string(), Value::String(id.clone()));
                }
                let cells = value.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                map.insert(VALUE_KEY.to_string(), Value::Object(cells));
                for (key, v) in extra {
                    map.entry(key.clone()).or_insert_with(|| v.clone());
                }
                Value::Object(map)
            }
            Self::Opaque(raw) => raw.clone(),
        }
    }

    /// Row identifier, if the row has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Cells { id, .. } => id.as_deref(),
            Self::Opaque(_) => None,
        }
    }

    /// Cell value for `column`, if the row is well formed and has that column.
    pub fn cell(&self, column: &str) -> Option<&FieldValue> {
        match self {
            Self::Cells { value, .. } => value.get(column),
            Self::Opaque(_) => None,
        }
    }
}

/// A `SUBTABLE` field value.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtable {
    /// Rows, in order.
    pub rows: Vec<Row>,
    /// Non-`value` attributes of the field.
    pub attributes: Attributes,
}

impl Subtable {
    /// Create a sub-table tagged `SUBTABLE`.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            attributes: tag_only(SUBTABLE),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single field value of a [`Record`] (or a cell of a [`Row`]).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Grouped rows.
    Subtable(Subtable),
    /// Selected users.
    UserSelect(UserSelect),
    /// Any other field kind, or a tagged value whose payload did not decode.
    Other(Value),
}

impl FieldValue {
    /// Decode a field value, dispatching on its `"type"` tag.
    ///
    /// A `SUBTABLE` whose `value` is not an array, or a `USER_SELECT` whose `value` is not a list
    /// of entity objects, is kept as [`FieldValue::Other`].
    pub fn from_json(value: Value) -> Self {
        let tag = value.get(TYPE_KEY).and_then(Value::as_str);
        let payload = value.get(VALUE_KEY);

        match tag {
            Some(SUBTABLE) if payload.is_some_and(Value::is_array) => {
                let (payload, attributes) = split_payload(value);
                let rows = match payload {
                    Some(Value::Array(items)) => items.into_iter().map(Row::from_json).collect(),
                    _ => Vec::new(),
                };
                Self::Subtable(Subtable { rows, attributes })
            }
            Some(USER_SELECT) => {
                let decoded = match payload {
                    Some(Value::Array(items)) => items
                        .iter()
                        .cloned()
                        .map(UserEntity::from_json)
                        .collect::<Option<Vec<_>>>(),
                    _ => None,
                };
                match decoded {
                    Some(entities) => {
                        let (_, attributes) = split_payload(value);
                        Self::UserSelect(UserSelect {
                            entities,
                            attributes,
                        })
                    }
                    _ => Self::Other(value),
                }
            }
            _ => Self::Other(value),
        }
    }

    /// Serialize the field value. Attributes come first, `value` last.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Subtable(table) => with_payload(
                &table.attributes,
                Value::Array(table.rows.iter().map(Row::to_json).collect()),
            ),
            Self::UserSelect(select) => with_payload(
                &select.attributes,
                Value::Array(select.entities.iter().map(UserEntity::to_json).collect()),
            ),
            Self::Other(raw) => raw.clone(),
        }
    }

    /// The `"type"` tag, if any.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Subtable(table) => table.attributes.get(TYPE_KEY).and_then(Value::as_str),
            Self::UserSelect(select) => select.attributes.get(TYPE_KEY).and_then(Value::as_str),
            Self::Other(raw) => raw.get(TYPE_KEY).and_then(Value::as_str),
        }
    }

    /// The sub-table, if this is a `SUBTABLE` value.
    pub fn as_subtable(&self) -> Option<&Subtable> {
        match self {
            Self::Subtable(table) => Some(table),
            _ => None,
        }
    }

    /// The user selection, if this is a `USER_SELECT` value.
    pub fn as_user_select(&self) -> Option<&UserSelect> {
        match self {
            Self::UserSelect(select) => Some(select),
            _ => None,
        }
    }

    /// Overwrite this value's `value` with `entities`, keeping every other attribute.
    ///
    /// A non-object value is replaced by `{"value": [...]}`.
    pub(crate) fn assign_selection(&mut self, entities: Vec<UserEntity>) {
        if let Self::UserSelect(select) = self {
            select.entities = entities;
            return;
        }

        let payload = Value::Array(entities.iter().map(UserEntity::to_json).collect());
        let mut map = match self.to_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert(VALUE_KEY.to_string(), payload);
        *self = Self::from_json(Value::Object(map));
    }
}

impl From<Subtable> for FieldValue {
    fn from(table: Subtable) -> Self {
        Self::Subtable(table)
    }
}

impl From<UserSelect> for FieldValue {
    fn from(select: UserSelect) -> Self {
        Self::UserSelect(select)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

/// A single host record: field code → value, in original field order.
///
/// Records are plain values. Projection never mutates one; it returns a new record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a record from a JSON object.
    pub fn from_json(value: Value) -> FlattenResult<Self> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(code, v)| (code, FieldValue::from_json(v)))
                .collect()),
            other => Err(FlattenError::SchemaMismatch {
                message: format!("record must be a json object, got {}", json_kind(&other)),
            }),
        }
    }

    /// Serialize the record as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(code, v)| (code.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field stored under `code`.
    pub fn get(&self, code: &str) -> Option<&FieldValue> {
        self.fields.get(code)
    }

    /// Mutable access to the field stored under `code`.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(code)
    }

    /// Whether the record has a field named `code`.
    pub fn contains(&self, code: &str) -> bool {
        self.fields.contains_key(code)
    }

    /// Insert or replace a field, returning the previous value. New fields go last.
    pub fn insert(
        &mut self,
        code: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(code.into(), value.into())
    }

    /// The sub-table stored under `code`, if that field exists and is a `SUBTABLE`.
    pub fn subtable(&self, code: &str) -> Option<&Subtable> {
        self.fields.get(code).and_then(FieldValue::as_subtable)
    }

    /// Iterate field codes in order.
    pub fn field_codes(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate `(code, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn tag_only(tag: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(TYPE_KEY.to_string(), Value::String(tag.to_string()));
    attributes
}

fn split_payload(value: Value) -> (Option<Value>, Attributes) {
    let mut payload = None;
    let mut attributes = Attributes::new();
    if let Value::Object(map) = value {
        for (key, v) in map {
            if key == VALUE_KEY {
                payload = Some(v);
            } else {
                attributes.insert(key, v);
            }
        }
    }
    (payload, attributes)
}

fn with_payload(attributes: &Attributes, payload: Value) -> Value {
    let mut map = attributes.clone();
    map.insert(VALUE_KEY.to_string(), payload);
    Value::Object(map)
}
