//! Registered models, checked for consistency once at startup.

use crate::error::ContentManagerError;
use folio_domain::config::ContentConfig;
use folio_domain::constants::RESERVED_ATTRIBUTES;
use folio_domain::schema::{AttributeKind, ModelDefinition, ModelKind, ModelSchema};
use fxhash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable lookup of groups and content types by uid.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    groups: BTreeMap<String, Arc<ModelSchema>>,
    content_types: BTreeMap<String, Arc<ModelSchema>>,
}

impl ModelRegistry {
    /// Builds the registry from configuration.
    ///
    /// # Errors
    /// Returns [`ContentManagerError::Schema`] when a uid is blank or duplicated, an
    /// attribute uses a reserved name, an enumeration declares no values, a group
    /// attribute is malformed or points at an unknown group, or two models share a
    /// collection.
    pub fn from_config(config: &ContentConfig) -> Result<Self, ContentManagerError> {
        let groups = collect(&config.groups, ModelKind::Group)?;
        let content_types = collect(&config.content_types, ModelKind::ContentType)?;
        let registry = Self { groups, content_types };
        registry.check_collections()?;

        for schema in registry.groups.values().chain(registry.content_types.values()) {
            registry.check_attributes(schema)?;
        }

        Ok(registry)
    }

    #[must_use]
    pub fn group(&self, uid: &str) -> Option<&Arc<ModelSchema>> {
        self.groups.get(uid)
    }

    #[must_use]
    pub fn content_type(&self, uid: &str) -> Option<&Arc<ModelSchema>> {
        self.content_types.get(uid)
    }

    #[must_use]
    pub fn model(&self, kind: ModelKind, uid: &str) -> Option<&Arc<ModelSchema>> {
        match kind {
            ModelKind::Group => self.group(uid),
            ModelKind::ContentType => self.content_type(uid),
        }
    }

    /// Models of one kind, ordered by uid.
    pub fn models(&self, kind: ModelKind) -> impl Iterator<Item = &Arc<ModelSchema>> {
        match kind {
            ModelKind::Group => self.groups.values(),
            ModelKind::ContentType => self.content_types.values(),
        }
    }

    /// Every model owns a distinct collection.
    fn check_collections(&self) -> Result<(), ContentManagerError> {
        let mut owners: FxHashMap<&str, &ModelSchema> = FxHashMap::default();

        for schema in self.groups.values().chain(self.content_types.values()) {
            if let Some(owner) = owners.insert(schema.collection_name.as_str(), schema) {
                return Err(ContentManagerError::schema(format!(
                    "{} `{}` and {} `{}`: collection `{}` is used twice",
                    owner.kind.as_str(),
                    owner.uid,
                    schema.kind.as_str(),
                    schema.uid,
                    schema.collection_name
                )));
            }
        }

        Ok(())
    }

    fn check_attributes(&self, schema: &ModelSchema) -> Result<(), ContentManagerError> {
        for (name, attribute) in &schema.attributes {
            let at = || format!("{}.{name}", schema.uid);

            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                return Err(ContentManagerError::schema(format!("{} uses a reserved name", at())));
            }

            match attribute.kind {
                AttributeKind::Enumeration if attribute.enumeration.is_empty() => {
                    return Err(ContentManagerError::schema(format!(
                        "{} must declare at least one enum value",
                        at()
                    )));
                },
                AttributeKind::Group => {
                    if schema.kind == ModelKind::Group {
                        return Err(ContentManagerError::schema(format!(
                            "{}: groups cannot nest other groups",
                            at()
                        )));
                    }
                    let Some(target) = attribute.group.as_deref() else {
                        return Err(ContentManagerError::schema(format!(
                            "{} is missing its `group` uid",
                            at()
                        )));
                    };
                    if !self.groups.contains_key(target) {
                        return Err(ContentManagerError::schema(format!(
                            "{} references unknown group `{target}`",
                            at()
                        )));
                    }
                    if !attribute.repeatable && (attribute.min.is_some() || attribute.max.is_some())
                    {
                        return Err(ContentManagerError::schema(format!(
                            "{}: min/max only apply to repeatable groups",
                            at()
                        )));
                    }
                    if let (Some(min), Some(max)) = (attribute.min, attribute.max)
                        && min > max
                    {
                        return Err(ContentManagerError::schema(format!(
                            "{}: min ({min}) is greater than max ({max})",
                            at()
                        )));
                    }
                },
                _ if attribute.group.is_some() => {
                    return Err(ContentManagerError::schema(format!(
                        "{}: only group attributes may reference a group",
                        at()
                    )));
                },
                _ => {},
            }
        }

        Ok(())
    }
}

fn collect(
    definitions: &[ModelDefinition],
    kind: ModelKind,
) -> Result<BTreeMap<String, Arc<ModelSchema>>, ContentManagerError> {
    let mut models = BTreeMap::new();

    for definition in definitions {
        if definition.uid.trim().is_empty() {
            return Err(ContentManagerError::schema(format!("a {} has an empty uid", kind.as_str())));
        }
        let schema = definition.clone().into_schema(kind);
        if models.insert(schema.uid.clone(), Arc::new(schema)).is_some() {
            return Err(ContentManagerError::schema(format!(
                "{} `{}` is declared twice",
                kind.as_str(),
                definition.uid
            )));
        }
    }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::schema::Attribute;

    fn config(groups: Vec<ModelDefinition>, content_types: Vec<ModelDefinition>) -> ContentConfig {
        ContentConfig { groups, content_types, ..ContentConfig::default() }
    }

    fn somegroup() -> ModelDefinition {
        ModelDefinition::new("somegroup").attribute("name", Attribute::new(AttributeKind::String))
    }

    #[test]
    fn registers_both_kinds() {
        let registry = ModelRegistry::from_config(&config(
            vec![somegroup()],
            vec![ModelDefinition::new("withgroup").attribute("field", Attribute::group("somegroup", false))],
        ))
        .unwrap();

        assert!(registry.group("somegroup").is_some());
        assert!(registry.content_type("withgroup").is_some());
        assert!(registry.model(ModelKind::Group, "withgroup").is_none());
        assert_eq!(registry.models(ModelKind::ContentType).count(), 1);
    }

    #[test]
    fn rejects_unknown_group_reference() {
        let err = ModelRegistry::from_config(&config(
            vec![],
            vec![ModelDefinition::new("withgroup").attribute("field", Attribute::group("missing", false))],
        ))
        .unwrap_err();

        assert!(err.to_string().contains("unknown group `missing`"));
    }

    #[test]
    fn rejects_reserved_names_and_duplicates() {
        let reserved = ModelRegistry::from_config(&config(
            vec![ModelDefinition::new("g").attribute("id", Attribute::new(AttributeKind::Integer))],
            vec![],
        ));
        assert!(matches!(reserved, Err(ContentManagerError::Schema { .. })));

        let duplicate = ModelRegistry::from_config(&config(vec![somegroup(), somegroup()], vec![]));
        assert!(duplicate.unwrap_err().to_string().contains("declared twice"));
    }

    #[test]
    fn rejects_empty_enumerations_and_nested_groups() {
        let empty_enum = ModelRegistry::from_config(&config(
            vec![],
            vec![ModelDefinition::new("e").attribute("field", Attribute::new(AttributeKind::Enumeration))],
        ));
        assert!(empty_enum.is_err());

        let nested = ModelRegistry::from_config(&config(
            vec![somegroup(), ModelDefinition::new("outer").attribute("inner", Attribute::group("somegroup", false))],
            vec![],
        ));
        assert!(nested.unwrap_err().to_string().contains("cannot nest"));
    }

    #[test]
    fn content_type_cannot_take_over_a_group_collection() {
        let err = ModelRegistry::from_config(&config(
            vec![somegroup()],
            vec![ModelDefinition::new("groups_somegroup").attribute("name", Attribute::new(AttributeKind::String))],
        ))
        .unwrap_err();

        assert!(matches!(err, ContentManagerError::Schema { .. }));
        assert!(err.to_string().contains("collection `groups_somegroup` is used twice"), "{err}");
    }

    #[test]
    fn content_types_cannot_share_a_collection() {
        let mut renamed = ModelDefinition::new("post").attribute("title", Attribute::new(AttributeKind::String));
        renamed.collection_name = Some("article".to_owned());

        let err = ModelRegistry::from_config(&config(
            vec![],
            vec![ModelDefinition::new("article").attribute("title", Attribute::new(AttributeKind::String)), renamed],
        ))
        .unwrap_err();

        assert!(err.to_string().contains("collection `article` is used twice"), "{err}");
    }
}
