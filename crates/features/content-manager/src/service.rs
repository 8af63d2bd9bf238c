//! Operations behind the content manager routes.

use crate::ContentManager;
use crate::coercion::{InputCoercer, WriteMode};
use crate::dto::{CountResponse, ListParams, ModelListResponse, ModelResponse, ModelView};
use crate::entries::{ENTRY_NOT_FOUND, ListQuery};
use crate::error::ContentManagerError;
use crate::formatting::{format_model, format_schema};
use crate::validation::ConfigurationValidator;
use folio_domain::schema::{ModelKind, ModelSchema};
use serde_json::Value;
use std::sync::Arc;

pub const GROUP_NOT_FOUND: &str = "group.notFound";
pub const CONTENT_TYPE_NOT_FOUND: &str = "contentType.notFound";

const fn not_found_key(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Group => GROUP_NOT_FOUND,
        ModelKind::ContentType => CONTENT_TYPE_NOT_FOUND,
    }
}

/// Entry ids are positive integers; anything else cannot name an entry.
fn entry_id(raw: &str) -> Result<u64, ContentManagerError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ContentManagerError::not_found(ENTRY_NOT_FOUND))
}

impl ContentManager {
    fn schema(&self, kind: ModelKind, uid: &str) -> Result<&Arc<ModelSchema>, ContentManagerError> {
        self.registry.model(kind, uid).ok_or_else(|| ContentManagerError::not_found(not_found_key(kind)))
    }

    /// Formatted schemas of every model of `kind`, ordered by uid.
    pub fn list_models(&self, kind: ModelKind) -> Result<ModelListResponse, ContentManagerError> {
        let data = self.registry.models(kind).map(|schema| format_model(schema)).collect::<Result<_, _>>()?;
        Ok(ModelListResponse { data })
    }

    /// Formatted schema merged with the stored, or default, configuration.
    pub fn find_model(&self, kind: ModelKind, uid: &str) -> Result<ModelResponse, ContentManagerError> {
        let schema = self.schema(kind, uid)?;
        let configuration = self.configurations.get_configuration(schema);

        Ok(ModelResponse {
            data: ModelView {
                uid: schema.uid.clone(),
                schema: format_schema(schema)?,
                settings: configuration.settings,
                metadata: configuration.metadata,
                layouts: configuration.layouts,
            },
        })
    }

    /// Validates `body` against the model, stores it and answers with the stored result.
    ///
    /// # Errors
    /// [`ContentManagerError::NotFound`] for an unknown uid and
    /// [`ContentManagerError::Validation`] listing every violation of the body.
    pub fn update_model(&self, kind: ModelKind, uid: &str, body: &Value) -> Result<ModelResponse, ContentManagerError> {
        let schema = self.schema(kind, uid)?;
        let patch = ConfigurationValidator::new(schema).validate(body)?;
        self.configurations.set_configuration(schema, patch);

        self.find_model(kind, uid)
    }

    pub fn list_entries(&self, model: &str, params: &ListParams) -> Result<Vec<Value>, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        let query = ListQuery::parse(
            schema,
            params.start.as_deref(),
            params.limit.as_deref(),
            params.sort.as_deref(),
            self.default_limit,
            self.max_limit,
        )?;

        self.entries.list(schema, &query)
    }

    pub fn count_entries(&self, model: &str) -> Result<CountResponse, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        Ok(CountResponse { count: self.entries.count(schema) })
    }

    pub fn find_entry(&self, model: &str, id: &str) -> Result<Value, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        self.entries.find(schema, entry_id(id)?)
    }

    pub fn create_entry(&self, model: &str, body: &Value) -> Result<Value, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        let input = InputCoercer::new(&self.registry, schema).coerce(body, WriteMode::Create)?;

        self.entries.create(schema, input)
    }

    /// The entry must exist before its body is looked at.
    pub fn update_entry(&self, model: &str, id: &str, body: &Value) -> Result<Value, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        let id = entry_id(id)?;
        self.entries.find(schema, id)?;
        let input = InputCoercer::new(&self.registry, schema).coerce(body, WriteMode::Update)?;

        self.entries.update(schema, id, input)
    }

    pub fn delete_entry(&self, model: &str, id: &str) -> Result<Value, ContentManagerError> {
        let schema = self.schema(ModelKind::ContentType, model)?;
        self.entries.delete(schema, entry_id(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentManager;
    use folio_domain::config::ContentConfig;
    use folio_domain::schema::{Attribute, AttributeKind, ModelDefinition};
    use serde_json::json;

    fn manager() -> ContentManager {
        let slice = crate::init(&ContentConfig {
            groups: vec![ModelDefinition::new("somegroup").attribute("name", Attribute::new(AttributeKind::String))],
            content_types: vec![
                ModelDefinition::new("article").attribute("title", Attribute::new(AttributeKind::String)),
            ],
            ..ContentConfig::default()
        })
        .unwrap();
        slice.downcast_ref::<ContentManager>().unwrap().clone()
    }

    #[test]
    fn unknown_models_use_kind_specific_keys() {
        let manager = manager();

        let group = manager.find_model(ModelKind::Group, "article").unwrap_err();
        assert!(matches!(group, ContentManagerError::NotFound { ref message, .. } if message == GROUP_NOT_FOUND));

        let entries = manager.list_entries("somegroup", &ListParams::default()).unwrap_err();
        assert!(
            matches!(entries, ContentManagerError::NotFound { ref message, .. } if message == CONTENT_TYPE_NOT_FOUND)
        );
    }

    #[test]
    fn malformed_entry_ids_are_not_found() {
        let manager = manager();
        manager.create_entry("article", &json!({ "title": "a" })).unwrap();

        for id in ["0", "-1", "abc", "1.5"] {
            let err = manager.find_entry("article", id).unwrap_err();
            assert!(matches!(err, ContentManagerError::NotFound { .. }), "id {id}");
        }
        assert_eq!(manager.find_entry("article", "1").unwrap()["title"], json!("a"));
    }

    #[test]
    fn update_of_a_missing_entry_is_not_found_before_validation() {
        let manager = manager();
        let err = manager.update_entry("article", "7", &json!({ "title": 3 })).unwrap_err();
        assert!(matches!(err, ContentManagerError::NotFound { .. }));
    }
}
