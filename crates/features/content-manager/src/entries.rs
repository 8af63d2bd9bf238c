//! In-memory entry storage with nested group records.
//!
//! Each collection (content type or group) keeps its own id sequence starting at 1. A
//! content-type record links the nested records of each group attribute by id; a nested
//! record lives exactly as long as it is linked.
//!
//! Writes take a single write lock: links are checked first, then the nested records and the
//! entry are mutated, so a rejected write leaves the store untouched.

use crate::coercion::{EntryInput, GroupWrite, NestedInput};
use crate::configuration::SortOrder;
use crate::error::{ContentManagerError, ValidationErrors};
use crate::registry::ModelRegistry;
use chrono::{DateTime, SecondsFormat, Utc};
use folio_domain::constants::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use folio_domain::schema::{AttributeCapabilities, ModelSchema};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const ENTRY_NOT_FOUND: &str = "entry.notFound";

#[derive(Debug, Clone)]
struct Record {
    fields: Map<String, Value>,
    /// Linked nested record ids per group attribute, in order.
    links: BTreeMap<String, Vec<u64>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Record {
    fn new(now: DateTime<Utc>) -> Self {
        Self { fields: Map::new(), links: BTreeMap::new(), created_at: now, updated_at: now }
    }
}

#[derive(Debug, Default)]
struct Collection {
    sequence: u64,
    records: BTreeMap<u64, Record>,
}

impl Collection {
    fn allocate(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

#[derive(Debug, Default)]
struct StoreState {
    collections: FxHashMap<String, Collection>,
}

impl StoreState {
    fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    fn collection_mut(&mut self, name: &str) -> &mut Collection {
        self.collections.entry(name.to_owned()).or_default()
    }

    fn record(&self, collection: &str, id: u64) -> Option<&Record> {
        self.collection(collection).and_then(|collection| collection.records.get(&id))
    }
}

/// Sort key of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: ID_FIELD.to_owned(), order: SortOrder::Asc }
    }
}

/// Pagination and ordering of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub start: usize,
    pub limit: usize,
    pub sort: Sort,
}

impl ListQuery {
    /// Parses `_start`, `_limit` and `_sort=field[:ASC|DESC]`.
    ///
    /// A missing `_limit` falls back to `default_limit`; larger values are capped at `max_limit`.
    pub fn parse(
        schema: &ModelSchema,
        start: Option<&str>,
        limit: Option<&str>,
        sort: Option<&str>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut number = |key: &str, raw: Option<&str>, default: usize| match raw {
            None => default,
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                errors.push(key, "must be a non-negative integer");
                default
            }),
        };
        let start = number("_start", start, 0);
        let limit = number("_limit", limit, default_limit).min(max_limit);

        let sort = match sort {
            None => Sort::default(),
            Some(raw) => {
                let (field, order) = raw.split_once(':').unwrap_or((raw, "ASC"));
                let order = SortOrder::parse(&order.to_ascii_uppercase()).unwrap_or_else(|| {
                    errors.push("_sort", "order must be ASC or DESC");
                    SortOrder::Asc
                });
                if !schema
                    .field_capabilities(field)
                    .is_some_and(|caps| caps.contains(AttributeCapabilities::SORTABLE))
                {
                    errors.push("_sort", format!("`{field}` is not a sortable field"));
                }
                Sort { field: field.to_owned(), order }
            },
        };

        errors.into_result(Self { start, limit, sort })
    }
}

/// Entries of every content type and the nested records of their groups.
#[derive(Debug, Clone)]
pub struct EntryStore {
    registry: Arc<ModelRegistry>,
    state: Arc<RwLock<StoreState>>,
}

impl EntryStore {
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry, state: Arc::default() }
    }

    pub fn create(&self, schema: &ModelSchema, input: EntryInput) -> Result<Value, ContentManagerError> {
        let mut state = self.state.write();
        let empty = BTreeMap::new();
        self.check_links(&state, schema, &empty, &input.groups)?;

        let now = Utc::now();
        let mut record = Record::new(now);
        record.fields = input.fields;
        self.write_groups(&mut state, schema, &mut record, input.groups, now);

        let id = {
            let collection = state.collection_mut(&schema.collection_name);
            let id = collection.allocate();
            collection.records.insert(id, record);
            id
        };
        debug!(collection = %schema.collection_name, id, "Entry created");

        self.render(&state, schema, id)
    }

    pub fn update(
        &self,
        schema: &ModelSchema,
        id: u64,
        input: EntryInput,
    ) -> Result<Value, ContentManagerError> {
        let mut state = self.state.write();
        let mut record = state
            .record(&schema.collection_name, id)
            .cloned()
            .ok_or_else(|| ContentManagerError::not_found(ENTRY_NOT_FOUND))?;
        self.check_links(&state, schema, &record.links, &input.groups)?;

        let now = Utc::now();
        record.fields.extend(input.fields);
        record.updated_at = now;
        self.write_groups(&mut state, schema, &mut record, input.groups, now);
        state.collection_mut(&schema.collection_name).records.insert(id, record);
        debug!(collection = %schema.collection_name, id, "Entry updated");

        self.render(&state, schema, id)
    }

    pub fn find(&self, schema: &ModelSchema, id: u64) -> Result<Value, ContentManagerError> {
        self.render(&self.state.read(), schema, id)
    }

    pub fn list(&self, schema: &ModelSchema, query: &ListQuery) -> Result<Vec<Value>, ContentManagerError> {
        let state = self.state.read();
        let Some(collection) = state.collection(&schema.collection_name) else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<u64> = collection.records.keys().copied().collect();
        if query.sort.field != ID_FIELD {
            let key = |id: &u64| collection.records.get(id).and_then(|record| record.fields.get(&query.sort.field));
            ids.sort_by(|a, b| compare_values(key(a), key(b)).then(a.cmp(b)));
        }
        if query.sort.order == SortOrder::Desc {
            ids.reverse();
        }

        ids.into_iter()
            .skip(query.start)
            .take(query.limit)
            .map(|id| self.render(&state, schema, id))
            .collect()
    }

    #[must_use]
    pub fn count(&self, schema: &ModelSchema) -> usize {
        self.state.read().collection(&schema.collection_name).map_or(0, |collection| collection.records.len())
    }

    /// Removes an entry and its nested records, returning the entry as it was.
    pub fn delete(&self, schema: &ModelSchema, id: u64) -> Result<Value, ContentManagerError> {
        let mut state = self.state.write();
        let rendered = self.render(&state, schema, id)?;

        let Some(record) = state.collection_mut(&schema.collection_name).records.remove(&id) else {
            return Err(ContentManagerError::not_found(ENTRY_NOT_FOUND));
        };
        for (name, attribute, group) in schema.group_attributes() {
            let Some(target) = self.registry.group(group) else { continue };
            let linked = record.links.get(name).map(Vec::as_slice).unwrap_or_default();
            let nested = state.collection_mut(&target.collection_name);
            for nested_id in linked {
                nested.records.remove(nested_id);
            }
            debug!(field = name, repeatable = attribute.repeatable, removed = linked.len(), "Nested records deleted");
        }
        debug!(collection = %schema.collection_name, id, "Entry deleted");

        Ok(rendered)
    }

    /// Every nested `id` must name a record currently linked to the same attribute.
    fn check_links(
        &self,
        state: &StoreState,
        schema: &ModelSchema,
        links: &BTreeMap<String, Vec<u64>>,
        groups: &BTreeMap<String, GroupWrite>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (name, write) in groups {
            let linked = links.get(name).map(Vec::as_slice).unwrap_or_default();
            let target = schema
                .attribute(name)
                .and_then(|attribute| attribute.group.as_deref())
                .and_then(|group| self.registry.group(group));
            let exists = |id: u64| {
                linked.contains(&id)
                    && target.is_some_and(|target| state.record(&target.collection_name, id).is_some())
            };

            let mut seen = FxHashSet::default();
            let mut check = |path: String, id: Option<u64>| {
                if let Some(id) = id
                    && (!exists(id) || !seen.insert(id))
                {
                    errors.push(format!("{path}.{ID_FIELD}"), format!("record {id} is not linked to this entry"));
                }
            };
            match write {
                GroupWrite::Clear => {},
                GroupWrite::Single(record) => check(name.clone(), record.id),
                GroupWrite::Many(records) => {
                    for (index, record) in records.iter().enumerate() {
                        check(format!("{name}[{index}]"), record.id);
                    }
                },
            }
        }

        errors.into_result(())
    }

    /// Applies group writes: updates linked records in place, creates new ones and deletes
    /// the records that are no longer linked.
    fn write_groups(
        &self,
        state: &mut StoreState,
        schema: &ModelSchema,
        record: &mut Record,
        groups: BTreeMap<String, GroupWrite>,
        now: DateTime<Utc>,
    ) {
        for (name, write) in groups {
            let Some(target) = schema
                .attribute(&name)
                .and_then(|attribute| attribute.group.as_deref())
                .and_then(|group| self.registry.group(group))
            else {
                continue;
            };

            let requested = match write {
                GroupWrite::Clear => Vec::new(),
                GroupWrite::Single(nested) => vec![nested],
                GroupWrite::Many(nested) => nested,
            };

            let collection = state.collection_mut(&target.collection_name);
            let mut next = Vec::with_capacity(requested.len());
            for NestedInput { id, fields } in requested {
                let id = match id.and_then(|id| collection.records.get_mut(&id).map(|nested| (id, nested))) {
                    Some((id, nested)) => {
                        nested.fields.extend(fields);
                        nested.updated_at = now;
                        id
                    },
                    None => {
                        let id = collection.allocate();
                        let mut nested = Record::new(now);
                        nested.fields = fields;
                        collection.records.insert(id, nested);
                        id
                    },
                };
                next.push(id);
            }

            let previous = record.links.insert(name, next.clone()).unwrap_or_default();
            for orphan in previous.into_iter().filter(|id| !next.contains(id)) {
                collection.records.remove(&orphan);
            }
        }
    }

    fn render(&self, state: &StoreState, schema: &ModelSchema, id: u64) -> Result<Value, ContentManagerError> {
        let record = state
            .record(&schema.collection_name, id)
            .ok_or_else(|| ContentManagerError::not_found(ENTRY_NOT_FOUND))?;

        let mut entry = Map::with_capacity(schema.attributes.len() + 3);
        entry.insert(ID_FIELD.to_owned(), Value::from(id));

        for (name, attribute) in &schema.attributes {
            let value = match attribute.group.as_deref().and_then(|group| self.registry.group(group)) {
                Some(target) => {
                    let linked = record.links.get(name).map(Vec::as_slice).unwrap_or_default();
                    let mut nested = linked.iter().filter_map(|nested_id| {
                        state
                            .record(&target.collection_name, *nested_id)
                            .map(|nested| render_nested(target, *nested_id, nested))
                    });
                    if attribute.repeatable {
                        Value::Array(nested.collect())
                    } else {
                        nested.next().unwrap_or(Value::Null)
                    }
                },
                None => record.fields.get(name).cloned().unwrap_or(Value::Null),
            };
            entry.insert(name.clone(), value);
        }

        entry.insert(CREATED_AT_FIELD.to_owned(), timestamp(record.created_at));
        entry.insert(UPDATED_AT_FIELD.to_owned(), timestamp(record.updated_at));
        Ok(Value::Object(entry))
    }
}

fn render_nested(schema: &ModelSchema, id: u64, record: &Record) -> Value {
    let mut nested = Map::with_capacity(schema.attributes.len() + 1);
    nested.insert(ID_FIELD.to_owned(), Value::from(id));
    for name in schema.attributes.keys() {
        nested.insert(name.clone(), record.fields.get(name).cloned().unwrap_or(Value::Null));
    }
    Value::Object(nested)
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::from(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Total order over stored scalars: missing and `null` first, then booleans, numbers, strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a.as_f64().unwrap_or_default().total_cmp(&b.as_f64().unwrap_or_default())
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}
