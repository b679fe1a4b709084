//! Named JSON Schema documents, loaded from disk once and memoized
//!
//! `<schemas_dir>/<name>.json` is read on the first request for `name`;
//! every later request returns the same `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

/// `$schema` URI for Draft-07.
pub const DRAFT7: &str = "http://json-schema.org/draft-07/schema#";

/// Shape of a composite "array of <resource>" schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSchema {
    pub min_items: u64,
    pub unique_items: bool,
}

impl Default for ListSchema {
    fn default() -> Self {
        Self {
            min_items: 1,
            unique_items: false,
        }
    }
}

/// Process-lifetime cache of schema documents.
#[derive(Debug)]
pub struct SchemaStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Value>>>,
}

impl SchemaStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the document for `name`.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Return the parsed document for `name`, reading it on first use.
    ///
    /// The lock is held while loading, so each name is read at most once.
    ///
    /// # Errors
    ///
    /// Returns error if the name is not a plain file stem, or the file is
    /// missing or not valid JSON. Failed loads are not cached.
    pub fn get(&self, name: &str) -> Result<Arc<Value>, SchemaError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(SchemaError::InvalidName(name.to_string()));
        }

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(schema) = cache.get(name) {
            return Ok(Arc::clone(schema));
        }

        let path = self.path_for(name);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| SchemaError::Io(path.clone(), e.to_string()))?;
        let schema: Value = serde_json::from_str(&content)
            .map_err(|e| SchemaError::Parse(path.clone(), e.to_string()))?;
        tracing::debug!(schema = name, path = %path.display(), "loaded schema");

        let schema = Arc::new(schema);
        cache.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Build "array of `name`" by wrapping the base document in `definitions`.
    ///
    /// # Errors
    ///
    /// Propagates load errors for `name`.
    pub fn list_of(&self, name: &str, shape: ListSchema) -> Result<Value, SchemaError> {
        let item = self.get(name)?;
        let mut definitions = serde_json::Map::new();
        definitions.insert(name.to_string(), item.as_ref().clone());
        let mut schema = json!({
            "$schema": DRAFT7,
            "definitions": definitions,
            "type": "array",
            "minItems": shape.min_items,
            "items": { "$ref": format!("#/definitions/{name}") },
        });
        if shape.unique_items {
            schema["uniqueItems"] = Value::Bool(true);
        }
        Ok(schema)
    }

    /// Names currently cached, sorted.
    #[must_use]
    pub fn cached_names(&self) -> Vec<String> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = cache.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid schema name {0:?}")]
    InvalidName(String),
    #[error("Cannot read schema {0}: {1}")]
    Io(PathBuf, String),
    #[error("Malformed schema {0}: {1}")]
    Parse(PathBuf, String),
}
