//! Wire shape of a model schema.

use crate::error::ContentManagerError;
use folio_derive::api_model;
use folio_domain::constants::ID_FIELD;
use folio_domain::schema::ModelSchema;
use serde_json::{Map, Value, json};

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct FormattedInfo {
    pub name: String,
    pub description: String,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct FormattedSchema {
    /// `group` or `contentType`
    pub model_type: String,
    pub collection_name: String,
    pub info: FormattedInfo,
    /// Attribute definitions keyed by name, `id` first
    pub attributes: Value,
}

/// Entry of the model listings.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct FormattedModel {
    pub uid: String,
    pub name: String,
    pub schema: FormattedSchema,
}

pub fn format_schema(schema: &ModelSchema) -> Result<FormattedSchema, ContentManagerError> {
    let mut attributes = Map::with_capacity(schema.attributes.len() + 1);
    attributes.insert(ID_FIELD.to_owned(), json!({ "type": "integer" }));
    for (name, attribute) in &schema.attributes {
        attributes.insert(name.clone(), serde_json::to_value(attribute)?);
    }

    Ok(FormattedSchema {
        model_type: schema.kind.as_str().to_owned(),
        collection_name: schema.collection_name.clone(),
        info: FormattedInfo {
            name: schema.info.name.clone(),
            description: schema.info.description.clone(),
        },
        attributes: Value::Object(attributes),
    })
}

pub fn format_model(schema: &ModelSchema) -> Result<FormattedModel, ContentManagerError> {
    Ok(FormattedModel {
        uid: schema.uid.clone(),
        name: schema.info.name.clone(),
        schema: format_schema(schema)?,
    })
}
