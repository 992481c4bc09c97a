use std::{fs, path::Path};

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

use crate::error::PipelineError;

pub const DATA_KEY: &str = "data";
pub const RECORD_FIELDS_KEY: &str = "Data";
pub const DESCRIPTION_KEY: &str = "Description";
pub const TITLE_KEY: &str = "TitleCaseName";
pub const SLUG_KEY: &str = "Slug";
pub const CATEGORY_KEY: &str = "Category";

/// A top-level JSON object whose `data` key holds the disease records.
///
/// Every other top-level key is kept untouched and written back in its
/// original position.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
    records: Vec<Value>,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let bytes = fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|source| PipelineError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(value).map_err(|reason| PipelineError::Shape {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut root) = value else {
            return Err("top-level value is not an object".to_string());
        };

        let records = match root.get_mut(DATA_KEY).map(Value::take) {
            Some(Value::Array(records)) => records,
            Some(_) => return Err(format!("'{}' is not a list", DATA_KEY)),
            None => return Err(format!("missing '{}' list", DATA_KEY)),
        };

        Ok(Self { root, records })
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Value] {
        &mut self.records
    }

    pub fn first_record(&self) -> Option<&Value> {
        self.records.first()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.root.len()))?;
        for (key, value) in &self.root {
            if key == DATA_KEY {
                map.serialize_entry(key, &self.records)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// The nested `Data` object of a record, if it has one.
pub fn record_fields(record: &Value) -> Option<&Map<String, Value>> {
    record.get(RECORD_FIELDS_KEY).and_then(Value::as_object)
}

pub fn record_fields_mut(record: &mut Value) -> Option<&mut Map<String, Value>> {
    record
        .get_mut(RECORD_FIELDS_KEY)
        .and_then(Value::as_object_mut)
}

pub fn field_text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}
