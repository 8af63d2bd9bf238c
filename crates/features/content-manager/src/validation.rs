//! Validation of configuration updates against the model they target.
//!
//! The validator never coerces: a `"10"` page size or a `1` boolean is a violation.
//! Keys it does not know are dropped, and every violation is reported, not only the first.

use crate::configuration::{
    ConfigurationPatch, EditMetadataPatch, FieldMetadataPatch, LayoutCell, LayoutsPatch,
    ListMetadataPatch, SettingsPatch, SortOrder,
};
use crate::error::ValidationErrors;
use folio_domain::constants::{ID_FIELD, LAYOUT_ROW_SIZE};
use folio_domain::schema::{AttributeCapabilities, ModelSchema};
use fxhash::FxHashSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

const PAGE_SIZE_RANGE: RangeInclusive<i64> = 1..=100;
const CELL_SIZE_RANGE: RangeInclusive<i64> = 1..=(LAYOUT_ROW_SIZE as i64);

/// Validates configuration bodies for one model.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationValidator<'a> {
    schema: &'a ModelSchema,
}

impl<'a> ConfigurationValidator<'a> {
    #[must_use]
    pub const fn new(schema: &'a ModelSchema) -> Self {
        Self { schema }
    }

    /// Turns a raw body into a patch, or lists every violation found.
    pub fn validate(&self, body: &Value) -> Result<ConfigurationPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(body) = body.as_object() else {
            errors.push("", "body must be an object");
            return Err(errors);
        };

        let patch = ConfigurationPatch {
            settings: body.get("settings").and_then(|value| self.settings(value, &mut errors)),
            metadata: body
                .get("metadata")
                .map(|value| self.metadata(value, &mut errors))
                .unwrap_or_default(),
            layouts: body.get("layouts").and_then(|value| self.layouts(value, &mut errors)),
        };

        errors.into_result(patch)
    }

    fn settings(&self, value: &Value, errors: &mut ValidationErrors) -> Option<SettingsPatch> {
        let mut reader = Reader::object(value, "settings", errors)?;

        let main_field = reader.string("mainField");
        if let Some(field) = &main_field
            && field != ID_FIELD
            && !self.has_capability(field, AttributeCapabilities::MAIN_FIELD)
        {
            reader.fail("mainField", format!("`{field}` cannot be used as the main field"));
        }

        let default_sort_by = reader.string("defaultSortBy");
        if let Some(field) = &default_sort_by
            && !self.has_capability(field, AttributeCapabilities::SORTABLE)
        {
            reader.fail("defaultSortBy", format!("`{field}` is not a sortable field"));
        }

        let default_sort_order = reader.string("defaultSortOrder").and_then(|order| {
            let parsed = SortOrder::parse(&order);
            if parsed.is_none() {
                reader.fail("defaultSortOrder", "must be one of the following values: ASC, DESC");
            }
            parsed
        });

        Some(SettingsPatch {
            searchable: reader.boolean("searchable"),
            filterable: reader.boolean("filterable"),
            bulkable: reader.boolean("bulkable"),
            page_size: reader
                .integer("pageSize", &PAGE_SIZE_RANGE)
                .and_then(|size| u32::try_from(size).ok()),
            main_field,
            default_sort_by,
            default_sort_order,
        })
    }

    fn metadata(
        &self,
        value: &Value,
        errors: &mut ValidationErrors,
    ) -> BTreeMap<String, FieldMetadataPatch> {
        let Some(fields) = Reader::object(value, "metadata", errors).map(|reader| reader.map) else {
            return BTreeMap::new();
        };

        fields
            .iter()
            .filter(|(field, _)| self.schema.has_field(field))
            .filter_map(|(field, value)| {
                let path = format!("metadata.{field}");
                let reader = Reader::object(value, &path, errors)?;
                let map = reader.map;

                let edit = map.get("edit").and_then(|edit| {
                    let mut edit = Reader::object(edit, &format!("{path}.edit"), errors)?;
                    Some(EditMetadataPatch {
                        label: edit.string("label"),
                        description: edit.string("description"),
                        placeholder: edit.string("placeholder"),
                        visible: edit.boolean("visible"),
                        editable: edit.boolean("editable"),
                    })
                });

                let list = map.get("list").and_then(|list| {
                    let mut list = Reader::object(list, &format!("{path}.list"), errors)?;
                    let searchable = list.boolean("searchable");
                    if searchable == Some(true)
                        && !self.has_capability(field, AttributeCapabilities::SEARCHABLE)
                    {
                        list.fail("searchable", format!("`{field}` cannot be searched"));
                    }
                    let sortable = list.boolean("sortable");
                    if sortable == Some(true)
                        && !self.has_capability(field, AttributeCapabilities::SORTABLE)
                    {
                        list.fail("sortable", format!("`{field}` cannot be sorted"));
                    }
                    Some(ListMetadataPatch { label: list.string("label"), searchable, sortable })
                });

                Some((field.clone(), FieldMetadataPatch { edit, list }))
            })
            .collect()
    }

    fn layouts(&self, value: &Value, errors: &mut ValidationErrors) -> Option<LayoutsPatch> {
        let reader = Reader::object(value, "layouts", errors)?;
        let map = reader.map;

        Some(LayoutsPatch {
            list: map.get("list").and_then(|list| self.list_layout(list, errors)),
            edit: map.get("edit").and_then(|edit| self.edit_layout(edit, errors)),
        })
    }

    fn list_layout(&self, value: &Value, errors: &mut ValidationErrors) -> Option<Vec<String>> {
        let Some(items) = value.as_array() else {
            errors.push("layouts.list", "must be an array");
            return None;
        };
        if items.is_empty() {
            errors.push("layouts.list", "must contain at least one field");
        }

        let mut seen = FxHashSet::default();
        let mut list = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = format!("layouts.list[{index}]");
            let Some(name) = item.as_str() else {
                errors.push(path, "must be a string");
                continue;
            };
            if !self.has_capability(name, AttributeCapabilities::LISTABLE) {
                errors.push(path, format!("`{name}` cannot be displayed in the list view"));
            } else if !seen.insert(name) {
                errors.push(path, format!("`{name}` is listed twice"));
            } else {
                list.push(name.to_owned());
            }
        }

        Some(list)
    }

    fn edit_layout(
        &self,
        value: &Value,
        errors: &mut ValidationErrors,
    ) -> Option<Vec<Vec<LayoutCell>>> {
        let Some(rows) = value.as_array() else {
            errors.push("layouts.edit", "must be an array");
            return None;
        };

        let mut placed = FxHashSet::default();
        let mut layout = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row_path = format!("layouts.edit[{row_index}]");
            let Some(cells) = row.as_array() else {
                errors.push(row_path, "must be an array");
                continue;
            };

            let mut width = 0_i64;
            let mut parsed = Vec::with_capacity(cells.len());
            for (cell_index, cell) in cells.iter().enumerate() {
                let cell_path = format!("{row_path}[{cell_index}]");
                let Some(mut reader) = Reader::object(cell, &cell_path, errors) else {
                    continue;
                };

                let name = reader.required_string("name");
                let size = reader.required_integer("size", &CELL_SIZE_RANGE);
                if let Some(size) = size {
                    width += size;
                }

                let Some(name) = name else { continue };
                if self.schema.attribute(&name).is_none() {
                    reader.fail("name", format!("`{name}` is not an attribute of this model"));
                } else if !placed.insert(name.clone()) {
                    reader.fail("name", format!("`{name}` is placed twice"));
                } else if let Some(size) = size.and_then(|size| u8::try_from(size).ok()) {
                    parsed.push(LayoutCell { name, size });
                }
            }

            if width > i64::from(LAYOUT_ROW_SIZE) {
                errors.push(row_path, format!("row is {width} columns wide, at most {LAYOUT_ROW_SIZE} fit"));
            }
            layout.push(parsed);
        }

        Some(layout)
    }

    fn has_capability(&self, field: &str, capability: AttributeCapabilities) -> bool {
        self.schema.field_capabilities(field).is_some_and(|caps| caps.contains(capability))
    }
}

/// Typed accessors over one JSON object that record violations under its path.
struct Reader<'v, 'e> {
    path: String,
    map: &'v Map<String, Value>,
    errors: &'e mut ValidationErrors,
}

impl<'v, 'e> Reader<'v, 'e> {
    fn object(value: &'v Value, path: &str, errors: &'e mut ValidationErrors) -> Option<Self> {
        match value.as_object() {
            Some(map) => Some(Self { path: path.to_owned(), map, errors }),
            None => {
                errors.push(path, "must be an object");
                None
            },
        }
    }

    fn key_path(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    fn fail(&mut self, key: &str, message: impl Into<String>) {
        let path = self.key_path(key);
        self.errors.push(path, message);
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.map.get(key)? {
            Value::Bool(value) => Some(*value),
            _ => {
                self.fail(key, "must be a boolean");
                None
            },
        }
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(value) => Some(value.clone()),
            _ => {
                self.fail(key, "must be a string");
                None
            },
        }
    }

    fn required_string(&mut self, key: &str) -> Option<String> {
        if !self.map.contains_key(key) {
            self.fail(key, "is required");
        }
        self.string(key)
    }

    fn integer(&mut self, key: &str, range: &RangeInclusive<i64>) -> Option<i64> {
        let value = self.map.get(key)?;
        let Some(number) = value.as_i64() else {
            self.fail(key, "must be an integer");
            return None;
        };
        if range.contains(&number) {
            Some(number)
        } else {
            self.fail(key, format!("must be between {} and {}", range.start(), range.end()));
            None
        }
    }

    fn required_integer(&mut self, key: &str, range: &RangeInclusive<i64>) -> Option<i64> {
        if !self.map.contains_key(key) {
            self.fail(key, "is required");
        }
        self.integer(key, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::schema::{Attribute, AttributeKind, ModelDefinition, ModelKind};
    use proptest::prelude::*;
    use serde_json::json;

    fn schema() -> ModelSchema {
        ModelDefinition::new("somegroup")
            .attribute("name", Attribute::new(AttributeKind::String))
            .attribute("notes", Attribute::new(AttributeKind::Richtext))
            .attribute("enabled", Attribute::new(AttributeKind::Boolean))
            .into_schema(ModelKind::Group)
    }

    fn paths(errors: &ValidationErrors) -> Vec<&str> {
        errors.issues().iter().map(|issue| issue.path.as_str()).collect()
    }

    #[test]
    fn accepts_a_complete_update() {
        let schema = schema();
        let patch = ConfigurationValidator::new(&schema)
            .validate(&json!({
                "settings": { "pageSize": 20, "mainField": "name", "defaultSortOrder": "DESC" },
                "metadata": { "name": { "edit": { "label": "Name", "placeholder": "Type" } } },
                "layouts": {
                    "list": ["id", "name"],
                    "edit": [[{ "name": "name", "size": 6 }, { "name": "enabled", "size": 4 }]]
                }
            }))
            .unwrap();

        let settings = patch.settings.unwrap();
        assert_eq!(settings.page_size, Some(20));
        assert_eq!(settings.default_sort_order, Some(SortOrder::Desc));
        assert_eq!(patch.metadata["name"].edit.as_ref().unwrap().placeholder.as_deref(), Some("Type"));
        assert_eq!(patch.layouts.unwrap().edit.unwrap()[0].len(), 2);
    }

    #[test]
    fn strips_unknown_keys_without_reporting() {
        let schema = schema();
        let patch = ConfigurationValidator::new(&schema)
            .validate(&json!({
                "attributes": { "hack": { "type": "string" } },
                "settings": { "unknown": 1 },
                "metadata": { "ghost": { "edit": { "label": 3 } } }
            }))
            .unwrap();

        assert_eq!(patch.settings, Some(SettingsPatch::default()));
        assert!(patch.metadata.is_empty());
        assert!(patch.layouts.is_none());
    }

    #[test]
    fn reports_every_violation() {
        let schema = schema();
        let errors = ConfigurationValidator::new(&schema)
            .validate(&json!({
                "settings": { "pageSize": "10", "searchable": 1, "mainField": "enabled" },
                "metadata": { "notes": { "list": { "sortable": true } } },
                "layouts": {
                    "list": ["notes", "name", "name"],
                    "edit": [[{ "name": "name", "size": 8 }, { "name": "notes", "size": 12 }]]
                }
            }))
            .unwrap_err();

        assert_eq!(
            paths(&errors),
            [
                "settings.mainField",
                "settings.searchable",
                "settings.pageSize",
                "metadata.notes.list.sortable",
                "layouts.list[0]",
                "layouts.list[2]",
                "layouts.edit[0]",
            ]
        );
    }

    #[test]
    fn rejects_non_object_bodies_and_sections() {
        let schema = schema();
        let validator = ConfigurationValidator::new(&schema);

        assert_eq!(paths(&validator.validate(&json!([])).unwrap_err()), [""]);
        assert_eq!(
            paths(&validator.validate(&json!({ "settings": null, "layouts": "x" })).unwrap_err()),
            ["settings", "layouts"]
        );
    }

    #[test]
    fn edit_cells_need_name_and_size_once() {
        let schema = schema();
        let errors = ConfigurationValidator::new(&schema)
            .validate(&json!({
                "layouts": { "edit": [
                    [{ "size": 4 }, { "name": "id", "size": 4 }],
                    [{ "name": "name", "size": 13 }, { "name": "name", "size": 2 }]
                ] }
            }))
            .unwrap_err();

        assert_eq!(
            paths(&errors),
            [
                "layouts.edit[0][0].name",
                "layouts.edit[0][1].name",
                "layouts.edit[1][0].size",
                "layouts.edit[1][1].name",
            ]
        );
    }

    proptest! {
        #[test]
        fn page_size_accepted_only_within_bounds(size in -50_i64..200) {
            let schema = schema();
            let result = ConfigurationValidator::new(&schema)
                .validate(&json!({ "settings": { "pageSize": size } }));
            prop_assert_eq!(result.is_ok(), (1..=100).contains(&size));
        }

        #[test]
        fn unknown_top_level_keys_never_fail(key in "[a-z]{1,12}", value in any::<i32>()) {
            prop_assume!(!["settings", "metadata", "layouts"].contains(&key.as_str()));
            let schema = schema();
            let result = ConfigurationValidator::new(&schema).validate(&json!({ key: value }));
            prop_assert_eq!(result, Ok(ConfigurationPatch::default()));
        }
    }
}
