use crate::{DocId, Field};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Inbound record as produced by a loader: an opaque identifier plus raw
/// name -> text pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), fields: HashMap::new() }
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.insert(name.into(), text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub identifier: String,
    pub fields: BTreeMap<Field, String>,
    /// Non-text members of the record, usable as exact-match filters.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub keywords: BTreeMap<String, String>,
}

impl Document {
    /// Text of `field`, or the empty string when the document lacks it.
    pub fn text(&self, field: Field) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn keyword(&self, name: &str) -> Option<&str> {
        self.keywords.get(name).map(String::as_str)
    }
}

/// Append-only, insertion-ordered document collection. Ids are positions.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document with the next sequential id. Names that are not
    /// text fields are kept as keyword values.
    pub fn insert<I, K, V>(&mut self, identifier: impl Into<String>, fields: I) -> &Document
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let id = self.docs.len() as DocId;
        let mut text_fields = BTreeMap::new();
        let mut keywords = BTreeMap::new();
        for (name, value) in fields {
            match name.as_ref().parse::<Field>() {
                Ok(field) => {
                    text_fields.insert(field, value.into());
                }
                Err(_) => {
                    keywords.insert(name.as_ref().to_string(), value.into());
                }
            }
        }
        self.docs.push(Document { id, identifier: identifier.into(), fields: text_fields, keywords });
        &self.docs[id as usize]
    }

    pub fn insert_record(&mut self, record: Record) -> &Document {
        self.insert(record.identifier, record.fields)
    }

    pub fn all(&self) -> &[Document] {
        &self.docs
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Extend<Record> for DocumentStore {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.insert_record(record);
        }
    }
}

impl FromIterator<Record> for DocumentStore {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut store = DocumentStore::new();
        store.extend(iter);
        store
    }
}
