//! Content manager configuration of a model: view settings, per-field metadata and layouts.
//!
//! A model without a stored configuration reads as the defaults generated from its schema.
//! Updates arrive as a [`ConfigurationPatch`] (already validated) and are merged onto the
//! current configuration section by section:
//!
//! * `settings`: each provided key overrides the stored one;
//! * `metadata`: merged per field, then per key inside `edit` and `list`;
//! * `layouts`: each provided layout replaces the stored one.

use folio_derive::api_model;
use folio_domain::constants::{ID_FIELD, LAYOUT_ROW_SIZE};
use folio_domain::schema::{AttributeCapabilities, ModelKind, ModelSchema};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Fields shown in the default list layout besides `id`.
const DEFAULT_LIST_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub searchable: bool,
    pub filterable: bool,
    pub bulkable: bool,
    pub page_size: u32,
    /// Field displayed as the entry title
    pub main_field: String,
    pub default_sort_by: String,
    pub default_sort_order: SortOrder,
}

#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EditMetadata {
    pub label: String,
    pub description: String,
    pub placeholder: String,
    pub visible: bool,
    pub editable: bool,
}

#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ListMetadata {
    pub label: String,
    pub searchable: bool,
    pub sortable: bool,
}

#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FieldMetadata {
    pub edit: EditMetadata,
    pub list: ListMetadata,
}

/// One field placed in an edit row.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct LayoutCell {
    pub name: String,
    /// Width in a 12-column row
    pub size: u8,
}

#[api_model]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Layouts {
    /// Columns of the list view
    pub list: Vec<String>,
    /// Rows of the edit view
    pub edit: Vec<Vec<LayoutCell>>,
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ModelConfiguration {
    pub settings: Settings,
    pub metadata: BTreeMap<String, FieldMetadata>,
    pub layouts: Layouts,
}

/// Accepted body of a configuration update; every section is optional.
#[api_model]
pub struct ConfigurationUpdate {
    pub settings: Option<Settings>,
    pub metadata: Option<BTreeMap<String, FieldMetadata>>,
    pub layouts: Option<Layouts>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub searchable: Option<bool>,
    pub filterable: Option<bool>,
    pub bulkable: Option<bool>,
    pub page_size: Option<u32>,
    pub main_field: Option<String>,
    pub default_sort_by: Option<String>,
    pub default_sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditMetadataPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub visible: Option<bool>,
    pub editable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMetadataPatch {
    pub label: Option<String>,
    pub searchable: Option<bool>,
    pub sortable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMetadataPatch {
    pub edit: Option<EditMetadataPatch>,
    pub list: Option<ListMetadataPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutsPatch {
    pub list: Option<Vec<String>>,
    pub edit: Option<Vec<Vec<LayoutCell>>>,
}

/// A validated configuration update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationPatch {
    pub settings: Option<SettingsPatch>,
    pub metadata: BTreeMap<String, FieldMetadataPatch>,
    pub layouts: Option<LayoutsPatch>,
}

macro_rules! merge {
    ($target:expr, $patch:expr, [$($field:ident),+ $(,)?]) => {
        $( if let Some(value) = $patch.$field { $target.$field = value; } )+
    };
}

impl ModelConfiguration {
    /// Default configuration derived from the schema.
    #[must_use]
    pub fn defaults(schema: &ModelSchema, page_size: u32) -> Self {
        let main_field = schema
            .attributes
            .iter()
            .find(|(_, attribute)| attribute.capabilities().contains(AttributeCapabilities::MAIN_FIELD))
            .map_or(ID_FIELD, |(name, _)| name.as_str())
            .to_owned();

        let default_sort_by = if schema
            .field_capabilities(&main_field)
            .is_some_and(|caps| caps.contains(AttributeCapabilities::SORTABLE))
        {
            main_field.clone()
        } else {
            ID_FIELD.to_owned()
        };

        let settings = Settings {
            searchable: true,
            filterable: true,
            bulkable: true,
            page_size,
            main_field,
            default_sort_by,
            default_sort_order: SortOrder::Asc,
        };

        let metadata = std::iter::once(ID_FIELD)
            .chain(schema.attributes.keys().map(String::as_str))
            .map(|name| (name.to_owned(), default_metadata(schema, name)))
            .collect();

        Self { settings, metadata, layouts: default_layouts(schema) }
    }

    /// Merges a validated patch onto this configuration.
    pub fn apply(&mut self, patch: ConfigurationPatch) {
        if let Some(settings) = patch.settings {
            merge!(self.settings, settings, [
                searchable,
                filterable,
                bulkable,
                page_size,
                main_field,
                default_sort_by,
                default_sort_order,
            ]);
        }

        for (field, update) in patch.metadata {
            let current = self.metadata.entry(field).or_default();
            if let Some(edit) = update.edit {
                merge!(current.edit, edit, [label, description, placeholder, visible, editable]);
            }
            if let Some(list) = update.list {
                merge!(current.list, list, [label, searchable, sortable]);
            }
        }

        if let Some(layouts) = patch.layouts {
            merge!(self.layouts, layouts, [list, edit]);
        }
    }
}

fn default_metadata(schema: &ModelSchema, name: &str) -> FieldMetadata {
    let label = upper_first(name);
    let capabilities = schema.field_capabilities(name).unwrap_or_else(AttributeCapabilities::empty);
    let editable = name != ID_FIELD;

    FieldMetadata {
        edit: EditMetadata {
            label: label.clone(),
            description: String::new(),
            placeholder: String::new(),
            visible: editable,
            editable,
        },
        list: ListMetadata {
            label,
            searchable: capabilities.contains(AttributeCapabilities::SEARCHABLE),
            sortable: capabilities.contains(AttributeCapabilities::SORTABLE),
        },
    }
}

fn default_layouts(schema: &ModelSchema) -> Layouts {
    let list = std::iter::once(ID_FIELD.to_owned())
        .chain(
            schema
                .attributes
                .iter()
                .filter(|(_, attribute)| attribute.capabilities().contains(AttributeCapabilities::LISTABLE))
                .map(|(name, _)| name.clone())
                .take(DEFAULT_LIST_FIELDS),
        )
        .collect();

    let mut edit: Vec<Vec<LayoutCell>> = Vec::new();
    let mut width = 0;
    for (name, attribute) in &schema.attributes {
        let size = attribute.kind.edit_size();
        match edit.last_mut() {
            Some(row) if width + size <= LAYOUT_ROW_SIZE => row.push(LayoutCell { name: name.clone(), size }),
            _ => {
                edit.push(vec![LayoutCell { name: name.clone(), size }]);
                width = 0;
            },
        }
        width += size;
    }

    Layouts { list, edit }
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Identifies a stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationKey {
    pub kind: ModelKind,
    pub uid: String,
}

impl ConfigurationKey {
    #[must_use]
    pub fn of(schema: &ModelSchema) -> Self {
        Self { kind: schema.kind, uid: schema.uid.clone() }
    }
}

/// Persistence of model configurations.
pub trait ConfigurationStore: Debug + Send + Sync {
    fn get(&self, key: &ConfigurationKey) -> Option<ModelConfiguration>;
    fn set(&self, key: ConfigurationKey, configuration: ModelConfiguration);
}

/// Process-local [`ConfigurationStore`].
#[derive(Debug, Default)]
pub struct MemoryConfigurationStore {
    entries: RwLock<FxHashMap<ConfigurationKey, ModelConfiguration>>,
}

impl ConfigurationStore for MemoryConfigurationStore {
    fn get(&self, key: &ConfigurationKey) -> Option<ModelConfiguration> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: ConfigurationKey, configuration: ModelConfiguration) {
        self.entries.write().insert(key, configuration);
    }
}

/// Reads and writes model configurations, falling back to schema defaults.
#[derive(Debug, Clone)]
pub struct ConfigurationService {
    store: Arc<dyn ConfigurationStore>,
    page_size: u32,
    writes: Arc<Mutex<()>>,
}

impl ConfigurationService {
    pub fn new(store: Arc<dyn ConfigurationStore>, page_size: u32) -> Self {
        Self { store, page_size, writes: Arc::new(Mutex::new(())) }
    }

    #[must_use]
    pub fn get_configuration(&self, schema: &ModelSchema) -> ModelConfiguration {
        self.store
            .get(&ConfigurationKey::of(schema))
            .unwrap_or_else(|| ModelConfiguration::defaults(schema, self.page_size))
    }

    /// Merges `patch` onto the current configuration and stores the result.
    pub fn set_configuration(&self, schema: &ModelSchema, patch: ConfigurationPatch) {
        let _guard = self.writes.lock();
        let mut configuration = self.get_configuration(schema);
        configuration.apply(patch);
        self.store.set(ConfigurationKey::of(schema), configuration);
        tracing::debug!(uid = %schema.uid, kind = schema.kind.as_str(), "Configuration stored");
    }
}
