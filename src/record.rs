use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rows with this name are rendered without an expandable description.
pub const NOT_EXPANDABLE: &str = "Not Expandable";

/// Rendered in place of a field that was never submitted.
pub const ABSENT_MARKER: &str = "undefined";

/// A row of the primary dataset held by the record store.
///
/// Submitted fields are kept verbatim (`age` may be a number or a string,
/// extra fields survive), so the body of a record is an ordered JSON map
/// rather than a fixed struct. `key` is assigned by the store unless the
/// submission carries its own, in which case that value is kept as sent.
/// `description` is always derived.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Record {
    pub key: Value,

    #[serde(flatten)]
    pub fields: Map<String, Value>,

    pub description: String,
}

impl Record {
    /// Build a record from a loosely typed submission.
    ///
    /// An array contributes its elements under the keys `"0"`, `"1"`, ...;
    /// any other non-object contributes no fields. A submitted
    /// `key` replaces the assigned one; a submitted `description` is
    /// replaced by the derived text. Remaining fields keep their order.
    ///
    /// # Arguments
    /// * `key` - The key assigned by the store
    /// * `submission` - The raw JSON value received from the client
    ///
    /// # Returns
    /// * `Record` - The record with its description derived from the template
    pub fn from_submission(key: u64, submission: Value) -> Self {
        let mut fields = match submission {
            Value::Object(map) => map,
            // Arrays spread their elements under index keys.
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            _ => Map::new(),
        };
        let key = fields.shift_remove("key").unwrap_or_else(|| Value::from(key));
        fields.shift_remove("description");

        let description = describe(
            fields.get("name"),
            fields.get("age"),
            fields.get("address"),
        );

        Record {
            key,
            fields,
            description,
        }
    }

    /// Seed row whose description is supplied instead of derived.
    pub(crate) fn seed(
        key: u64,
        name: &str,
        age: u32,
        address: &str,
        description: Option<&str>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("age".to_string(), Value::from(age));
        fields.insert("address".to_string(), Value::from(address));

        let description = match description {
            Some(text) => text.to_string(),
            None => describe(
                fields.get("name"),
                fields.get("age"),
                fields.get("address"),
            ),
        };

        Record {
            key: Value::from(key),
            fields,
            description,
        }
    }

    /// Key as an integer, when it is one
    pub fn key_number(&self) -> Option<u64> {
        self.key.as_u64()
    }

    pub fn name(&self) -> Option<&Value> {
        self.fields.get("name")
    }

    pub fn age(&self) -> Option<&Value> {
        self.fields.get("age")
    }

    pub fn address(&self) -> Option<&Value> {
        self.fields.get("address")
    }

    /// Whether the table should offer to expand this row's description.
    pub fn is_expandable(&self) -> bool {
        self.name().and_then(Value::as_str) != Some(NOT_EXPANDABLE)
    }
}

/// Fill the description template for the given field values.
///
/// # Examples
/// ```
/// use record_table::record::describe;
/// use serde_json::json;
///
/// let text = describe(Some(&json!("Ann")), Some(&json!(25)), Some(&json!("X")));
/// assert_eq!(text, "My name is Ann, I am 25 years old, living in X.");
///
/// let text = describe(None, None, None);
/// assert_eq!(text, "My name is undefined, I am undefined years old, living in undefined.");
/// ```
pub fn describe(name: Option<&Value>, age: Option<&Value>, address: Option<&Value>) -> String {
    format!(
        "My name is {}, I am {} years old, living in {}.",
        template_text(name),
        template_text(age),
        template_text(address)
    )
}

/// Render a JSON value the way a string template interpolates it.
pub fn template_text(value: Option<&Value>) -> String {
    match value {
        None => ABSENT_MARKER.to_string(),
        Some(value) => value_text(value),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Integral floats print without a trailing ".0"; `+ 0.0` folds -0 into 0.
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{:.0}", f + 0.0)
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        // Nested holes inside arrays render empty, not "undefined"/"null".
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
