use serde_json::Value;

use crate::record::Record;

/// In-memory, insertion-ordered list of records.
///
/// The store lives as long as the process that owns it; nothing is written
/// to disk. Keys are assigned as `len + 1`, so they are unique only as long
/// as appends are serialized by the owner.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the four demo rows the server starts with
    ///
    /// # Returns
    /// * `RecordStore` - Store with keys 1 through 4
    pub fn seeded() -> Self {
        let records = vec![
            Record::seed(1, "John Brown", 32, "New York No. 1 Lake Park", None),
            Record::seed(2, "Jim Green", 42, "London No. 1 Lake Park", None),
            Record::seed(
                3,
                "John Cena",
                29,
                "Jiangsu No. 1 Lake Park",
                Some("This not expandable"),
            ),
            Record::seed(4, "Joe Black", 32, "Sydney No. 1 Lake Park", None),
        ];

        RecordStore { records }
    }

    /// Append a loosely typed submission as a new record
    ///
    /// No validation is performed: a submission without `name`, `age` or
    /// `address` still produces a record, with the missing values rendered
    /// as `undefined` in its description. The assigned key is `len + 1`
    /// even when earlier submissions brought their own keys.
    ///
    /// # Arguments
    /// * `submission` - Raw JSON value sent by the client
    ///
    /// # Returns
    /// * `Record` - A copy of the record that was stored
    ///
    /// # Examples
    /// ```
    /// use record_table::store::RecordStore;
    /// use serde_json::json;
    ///
    /// let mut store = RecordStore::new();
    /// let record = store.append(json!({"name": "A", "age": 5, "address": "B"}));
    /// assert_eq!(record.key, json!(1));
    /// assert_eq!(store.list().len(), 1);
    /// ```
    pub fn append(&mut self, submission: Value) -> Record {
        let key = self.records.len() as u64 + 1;
        let record = Record::from_submission(key, submission);
        self.records.push(record.clone());
        record
    }

    /// All records in insertion order
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeded_store_has_four_rows() {
        let store = RecordStore::seeded();
        let keys: Vec<u64> = store.list().iter().filter_map(Record::key_number).collect();
        assert_eq!(keys, vec![1, 2, 3, 4]);
        assert_eq!(
            store.list()[0].description,
            "My name is John Brown, I am 32 years old, living in New York No. 1 Lake Park."
        );
        assert_eq!(store.list()[2].description, "This not expandable");
    }

    #[test]
    fn append_then_list_round_trip() {
        let mut store = RecordStore::seeded();
        let before = store.len();

        let created = store.append(json!({"name": "A", "age": 5, "address": "B"}));

        let listed = store.list().last().unwrap();
        assert_eq!(listed, &created);
        assert_eq!(listed.key_number(), Some(before as u64 + 1));
        assert_eq!(listed.description, "My name is A, I am 5 years old, living in B.");
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut store = RecordStore::new();
        assert!(store.is_empty());

        for name in ["first", "second", "third"] {
            store.append(json!({ "name": name }));
        }

        let names: Vec<&str> = store
            .list()
            .iter()
            .filter_map(|r| r.name().and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(store.list()[2].key, json!(3));
    }

    #[test]
    fn append_accepts_anything() {
        let mut store = RecordStore::new();
        let record = store.append(Value::Null);
        assert_eq!(record.key, json!(1));
        assert_eq!(
            record.description,
            "My name is undefined, I am undefined years old, living in undefined."
        );
    }

    #[test]
    fn submitted_key_overrides_assigned_one() {
        let mut store = RecordStore::seeded();

        let record = store.append(json!({"key": 99, "name": "A", "age": 5, "address": "B"}));
        assert_eq!(record.key, json!(99));

        let next = store.append(json!({"name": "C"}));
        assert_eq!(next.key, json!(6));
        assert_eq!(store.len(), 6);
    }
}
