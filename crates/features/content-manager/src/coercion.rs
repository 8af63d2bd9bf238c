//! Input layer of the entry API: turns a request document into typed field writes.
//!
//! Unknown keys (including `id` and the timestamps) are dropped. Values are coerced per
//! attribute kind; anything that cannot be coerced is reported, and all reports for one
//! document are returned together.

use crate::error::ValidationErrors;
use crate::registry::ModelRegistry;
use chrono::{DateTime, NaiveDate, SecondsFormat};
use folio_domain::constants::ID_FIELD;
use folio_domain::schema::{Attribute, AttributeKind, ModelSchema};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Missing attributes are written as `null`; required ones must be present.
    Create,
    /// Missing attributes keep their stored value.
    Update,
}

/// One nested group record as sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedInput {
    /// Present when the client targets an already linked record.
    pub id: Option<u64>,
    pub fields: Map<String, Value>,
}

/// Requested state of a group attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupWrite {
    Clear,
    Single(NestedInput),
    Many(Vec<NestedInput>),
}

/// Coerced document of an entry write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryInput {
    pub fields: Map<String, Value>,
    pub groups: BTreeMap<String, GroupWrite>,
}

/// Coerces documents for one content type.
#[derive(Debug, Clone, Copy)]
pub struct InputCoercer<'a> {
    registry: &'a ModelRegistry,
    schema: &'a ModelSchema,
}

impl<'a> InputCoercer<'a> {
    #[must_use]
    pub const fn new(registry: &'a ModelRegistry, schema: &'a ModelSchema) -> Self {
        Self { registry, schema }
    }

    pub fn coerce(&self, body: &Value, mode: WriteMode) -> Result<EntryInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(body) = body.as_object() else {
            errors.push("", "body must be an object");
            return Err(errors);
        };

        let mut input = EntryInput::default();
        for (name, attribute) in &self.schema.attributes {
            let value = body.get(name);
            if let Some(group) = attribute.group.as_deref() {
                if let Some(write) = self.group(name, attribute, group, value, mode, &mut errors) {
                    input.groups.insert(name.clone(), write);
                }
            } else if let Some(value) = field(name, attribute, value, mode, &mut errors) {
                input.fields.insert(name.clone(), value);
            }
        }

        errors.into_result(input)
    }

    fn group(
        &self,
        name: &str,
        attribute: &Attribute,
        group: &str,
        value: Option<&Value>,
        mode: WriteMode,
        errors: &mut ValidationErrors,
    ) -> Option<GroupWrite> {
        let value = match value {
            None if mode == WriteMode::Update => return None,
            None | Some(Value::Null) => {
                if attribute.required {
                    errors.push(name, "is required");
                }
                return Some(GroupWrite::Clear);
            },
            Some(value) => value,
        };

        let Some(schema) = self.registry.group(group) else {
            errors.push(name, format!("group `{group}` is not registered"));
            return None;
        };

        if !attribute.repeatable {
            if !value.is_object() {
                errors.push(name, "must be an object or null");
                return None;
            }
            return nested(schema, name, value, errors).map(GroupWrite::Single);
        }

        let Some(items) = value.as_array() else {
            errors.push(name, "must be an array or null");
            return None;
        };
        if let Some(min) = attribute.min
            && items.len() < min
        {
            errors.push(name, format!("must contain at least {min} items"));
        }
        if let Some(max) = attribute.max
            && items.len() > max
        {
            errors.push(name, format!("must contain at most {max} items"));
        }

        let records: Vec<Option<NestedInput>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let path = format!("{name}[{index}]");
                if item.is_object() {
                    nested(schema, &path, item, errors)
                } else {
                    errors.push(path, "must be an object");
                    None
                }
            })
            .collect();

        records.into_iter().collect::<Option<Vec<_>>>().map(GroupWrite::Many)
    }
}

/// Coerces a nested record. Without an `id` it is a new record, so it gets every attribute.
fn nested(
    schema: &ModelSchema,
    path: &str,
    value: &Value,
    errors: &mut ValidationErrors,
) -> Option<NestedInput> {
    let object = value.as_object()?;
    let before = errors.issues().len();

    let id = match object.get(ID_FIELD) {
        None | Some(Value::Null) => None,
        Some(raw) => match raw.as_u64().filter(|id| *id > 0) {
            Some(id) => Some(id),
            None => {
                errors.push(format!("{path}.{ID_FIELD}"), "must be a positive integer");
                None
            },
        },
    };
    let mode = if id.is_some() { WriteMode::Update } else { WriteMode::Create };

    let mut fields = Map::new();
    for (name, attribute) in &schema.attributes {
        let field_path = format!("{path}.{name}");
        if let Some(value) = field(&field_path, attribute, object.get(name), mode, errors) {
            fields.insert(name.clone(), value);
        }
    }

    (errors.issues().len() == before).then_some(NestedInput { id, fields })
}

/// Coerces a scalar attribute; `None` means "leave untouched" or a reported violation.
fn field(
    path: &str,
    attribute: &Attribute,
    value: Option<&Value>,
    mode: WriteMode,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    match value {
        None if mode == WriteMode::Update => None,
        None | Some(Value::Null) => {
            if attribute.required {
                errors.push(path, "is required");
                None
            } else {
                Some(Value::Null)
            }
        },
        Some(value) => match coerce_scalar(attribute, value) {
            Ok(value) => Some(value),
            Err(message) => {
                errors.push(path, message);
                None
            },
        },
    }
}

/// Coerces a non-null value of a scalar attribute.
pub fn coerce_scalar(attribute: &Attribute, value: &Value) -> Result<Value, String> {
    match attribute.kind {
        AttributeKind::String
        | AttributeKind::Text
        | AttributeKind::Richtext
        | AttributeKind::Password => string(value).map(Value::from),
        AttributeKind::Email => string(value).and_then(|email| {
            match email.split_once('@') {
                Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(Value::from(email)),
                _ => Err("must be a valid email".to_owned()),
            }
        }),
        AttributeKind::Uid => string(value).and_then(|uid| {
            if !uid.is_empty() && uid.chars().all(|c| c.is_ascii_alphanumeric() || "-_.~".contains(c)) {
                Ok(Value::from(uid))
            } else {
                Err("must only contain letters, digits and `-_.~`".to_owned())
            }
        }),
        AttributeKind::Integer | AttributeKind::Biginteger => integer(value).map(Value::from),
        AttributeKind::Float | AttributeKind::Decimal => value
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| "must be a number".to_owned()),
        AttributeKind::Boolean => boolean(value).map(Value::Bool),
        AttributeKind::Enumeration => string(value).and_then(|choice| {
            if attribute.enumeration.iter().any(|allowed| *allowed == choice) {
                Ok(Value::from(choice))
            } else {
                Err(format!("must be one of the following values: {}", attribute.enumeration.join(", ")))
            }
        }),
        AttributeKind::Date => string(value).and_then(|date| {
            NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map(|date| Value::from(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| "must be a date formatted as YYYY-MM-DD".to_owned())
        }),
        AttributeKind::Datetime => string(value).and_then(|datetime| {
            DateTime::parse_from_rfc3339(&datetime)
                .map(|parsed| Value::from(parsed.to_utc().to_rfc3339_opts(SecondsFormat::Millis, true)))
                .map_err(|_| "must be an RFC 3339 datetime".to_owned())
        }),
        AttributeKind::Json => Ok(value.clone()),
        AttributeKind::Group => Err("group values cannot be nested here".to_owned()),
    }
}

fn string(value: &Value) -> Result<String, String> {
    value.as_str().map(str::to_owned).ok_or_else(|| "must be a string".to_owned())
}

fn integer(value: &Value) -> Result<i64, String> {
    if let Some(number) = value.as_i64() {
        return Ok(number);
    }
    match value.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(number) if number.fract() == 0.0 && number.abs() < 9.0e15 => Ok(number as i64),
        _ => Err("must be an integer".to_owned()),
    }
}

fn boolean(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err("must be a boolean".to_owned()),
        },
        _ => Err("must be a boolean".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::config::ContentConfig;
    use folio_domain::schema::ModelDefinition;
    use proptest::prelude::*;
    use serde_json::json;

    fn registry() -> ModelRegistry {
        ModelRegistry::from_config(&ContentConfig {
            groups: vec![
                ModelDefinition::new("somegroup")
                    .attribute("name", Attribute::new(AttributeKind::String))
                    .attribute("rank", Attribute::new(AttributeKind::Integer).required()),
            ],
            content_types: vec![
                ModelDefinition::new("withgroup")
                    .attribute("field", Attribute::group("somegroup", false))
                    .attribute("title", Attribute::new(AttributeKind::String).required()),
                ModelDefinition::new("withrepeatable").attribute(
                    "items",
                    Attribute { min: Some(1), max: Some(2), ..Attribute::group("somegroup", true) },
                ),
            ],
            ..ContentConfig::default()
        })
        .unwrap()
    }

    fn coerce(uid: &str, body: Value, mode: WriteMode) -> Result<EntryInput, ValidationErrors> {
        let registry = registry();
        let schema = registry.content_type(uid).unwrap().clone();
        InputCoercer::new(&registry, &schema).coerce(&body, mode)
    }

    fn paths(errors: &ValidationErrors) -> Vec<String> {
        errors.issues().iter().map(|issue| issue.path.clone()).collect()
    }

    #[test]
    fn create_fills_missing_fields_and_strips_unknown_keys() {
        let input = coerce(
            "withgroup",
            json!({ "title": "Hi", "id": 9, "created_at": "x", "other": true }),
            WriteMode::Create,
        )
        .unwrap();

        assert_eq!(input.fields, json!({ "title": "Hi" }).as_object().cloned().unwrap());
        assert_eq!(input.groups["field"], GroupWrite::Clear);
    }

    #[test]
    fn update_leaves_missing_fields_out() {
        let input = coerce("withgroup", json!({}), WriteMode::Update).unwrap();
        assert!(input.fields.is_empty());
        assert!(input.groups.is_empty());
    }

    #[test]
    fn non_object_groups_are_rejected() {
        for value in [json!([]), json!("someString"), json!(128_219), json!(false)] {
            let errors =
                coerce("withgroup", json!({ "title": "t", "field": value }), WriteMode::Create).unwrap_err();
            assert_eq!(paths(&errors), ["field"]);
        }
    }

    #[test]
    fn nested_records_are_coerced_against_the_group() {
        let input = coerce(
            "withgroup",
            json!({ "title": "t", "field": { "id": 4, "name": "x", "extra": 1 } }),
            WriteMode::Update,
        )
        .unwrap();
        let GroupWrite::Single(record) = &input.groups["field"] else { panic!("single expected") };
        assert_eq!(record.id, Some(4));
        assert_eq!(record.fields, json!({ "name": "x" }).as_object().cloned().unwrap());

        let errors = coerce(
            "withgroup",
            json!({ "title": "t", "field": { "id": "invalid_id", "name": "x" } }),
            WriteMode::Create,
        )
        .unwrap_err();
        assert_eq!(paths(&errors), ["field.id", "field.rank"]);
    }

    #[test]
    fn repeatable_groups_respect_bounds() {
        let errors = coerce("withrepeatable", json!({ "items": [] }), WriteMode::Create).unwrap_err();
        assert_eq!(paths(&errors), ["items"]);

        let errors = coerce(
            "withrepeatable",
            json!({ "items": [{ "rank": 1 }, 3, { "rank": "x" }] }),
            WriteMode::Create,
        )
        .unwrap_err();
        assert_eq!(paths(&errors), ["items", "items[1]", "items[2].rank"]);

        let input =
            coerce("withrepeatable", json!({ "items": [{ "rank": 1 }, { "rank": 2.0 }] }), WriteMode::Create)
                .unwrap();
        let GroupWrite::Many(records) = &input.groups["items"] else { panic!("many expected") };
        assert_eq!(records[1].fields["rank"], json!(2));
        assert_eq!(records[0].fields["name"], Value::Null);
    }

    #[test]
    fn required_fields_cannot_be_missing_or_null() {
        let created = coerce("withgroup", json!({}), WriteMode::Create).unwrap_err();
        assert_eq!(paths(&created), ["title"]);

        let updated = coerce("withgroup", json!({ "title": null }), WriteMode::Update).unwrap_err();
        assert_eq!(paths(&updated), ["title"]);
    }

    #[test]
    fn scalar_coercions() {
        let float = Attribute::new(AttributeKind::Float);
        assert_eq!(coerce_scalar(&float, &json!(14)).unwrap().to_string(), "14.0");

        let boolean = Attribute::new(AttributeKind::Boolean);
        assert_eq!(coerce_scalar(&boolean, &json!(1)), Ok(json!(true)));
        assert_eq!(coerce_scalar(&boolean, &json!(0)), Ok(json!(false)));
        assert!(coerce_scalar(&boolean, &json!("true")).is_err());
        assert!(coerce_scalar(&boolean, &json!(2)).is_err());

        let richtext = Attribute::new(AttributeKind::Richtext);
        assert_eq!(coerce_scalar(&richtext, &json!("Some\ntext \"quoted\"")), Ok(json!("Some\ntext \"quoted\"")));

        let enumeration = Attribute::enumeration(["one", "two"]);
        assert_eq!(coerce_scalar(&enumeration, &json!("two")), Ok(json!("two")));
        assert_eq!(
            coerce_scalar(&enumeration, &json!("three")),
            Err("must be one of the following values: one, two".to_owned())
        );

        let datetime = Attribute::new(AttributeKind::Datetime);
        assert_eq!(
            coerce_scalar(&datetime, &json!("2019-07-04T10:00:00+02:00")),
            Ok(json!("2019-07-04T08:00:00.000Z"))
        );

        let email = Attribute::new(AttributeKind::Email);
        assert!(coerce_scalar(&email, &json!("user@example.com")).is_ok());
        assert!(coerce_scalar(&email, &json!("nope")).is_err());
    }

    proptest! {
        #[test]
        fn integers_become_floats(value in any::<i32>()) {
            let float = Attribute::new(AttributeKind::Float);
            let coerced = coerce_scalar(&float, &json!(value)).unwrap();
            prop_assert!(coerced.is_f64());
            prop_assert_eq!(coerced.as_f64(), Some(f64::from(value)));
        }

        #[test]
        fn text_is_preserved_exactly(text in any::<String>()) {
            let richtext = Attribute::new(AttributeKind::Richtext);
            prop_assert_eq!(coerce_scalar(&richtext, &json!(text.clone())), Ok(Value::String(text)));
        }

        #[test]
        fn only_zero_and_one_become_booleans(value in any::<i64>()) {
            let boolean = Attribute::new(AttributeKind::Boolean);
            let result = coerce_scalar(&boolean, &json!(value));
            prop_assert_eq!(result.is_ok(), value == 0 || value == 1);
        }
    }
}
