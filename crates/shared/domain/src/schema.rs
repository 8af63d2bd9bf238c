//! Content schemas: attribute kinds, their capabilities, and model definitions.
//!
//! A [`ModelDefinition`] is what operators write in the configuration file. The content
//! manager turns each one into a [`ModelSchema`] tagged with its [`ModelKind`].

use crate::constants::ID_FIELD;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

bitflags! {
    /// What the content manager may do with a field of a given kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeCapabilities: u8 {
        const SORTABLE = 1 << 0;
        const SEARCHABLE = 1 << 1;
        const LISTABLE = 1 << 2;
        /// Can be displayed as the entry's title.
        const MAIN_FIELD = 1 << 3;

        const SCALAR = Self::SORTABLE.bits() | Self::SEARCHABLE.bits() | Self::LISTABLE.bits();
        const TEXTUAL = Self::SCALAR.bits() | Self::MAIN_FIELD.bits();
    }
}

/// The type of an attribute as declared in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Text,
    Richtext,
    Email,
    Password,
    Uid,
    Integer,
    Biginteger,
    Float,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Enumeration,
    Json,
    Group,
}

impl AttributeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Richtext => "richtext",
            Self::Email => "email",
            Self::Password => "password",
            Self::Uid => "uid",
            Self::Integer => "integer",
            Self::Biginteger => "biginteger",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Enumeration => "enumeration",
            Self::Json => "json",
            Self::Group => "group",
        }
    }

    #[must_use]
    pub const fn capabilities(self) -> AttributeCapabilities {
        match self {
            Self::String | Self::Text | Self::Email | Self::Uid | Self::Enumeration => {
                AttributeCapabilities::TEXTUAL
            },
            Self::Integer
            | Self::Biginteger
            | Self::Float
            | Self::Decimal
            | Self::Boolean
            | Self::Date
            | Self::Datetime => AttributeCapabilities::SCALAR,
            Self::Richtext => AttributeCapabilities::SEARCHABLE,
            Self::Password | Self::Json | Self::Group => AttributeCapabilities::empty(),
        }
    }

    /// Default width of the field in a 12-column edit row.
    #[must_use]
    pub const fn edit_size(self) -> u8 {
        match self {
            Self::Boolean => 4,
            Self::Richtext | Self::Json | Self::Group => 12,
            _ => 6,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Declared values of an `enumeration` attribute.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    /// Target group uid of a `group` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeatable: bool,
    /// Lower bound on the number of records of a repeatable group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl Attribute {
    #[must_use]
    pub const fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            enumeration: Vec::new(),
            group: None,
            repeatable: false,
            min: None,
            max: None,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn group(uid: impl Into<String>, repeatable: bool) -> Self {
        Self { group: Some(uid.into()), repeatable, ..Self::new(AttributeKind::Group) }
    }

    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enumeration: values.into_iter().map(Into::into).collect(),
            ..Self::new(AttributeKind::Enumeration)
        }
    }

    #[must_use]
    pub const fn capabilities(&self) -> AttributeCapabilities {
        self.kind.capabilities()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// Whether a model is a top-level content type or a reusable group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelKind {
    Group,
    ContentType,
}

impl ModelKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::ContentType => "contentType",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    pub name: String,
    pub description: String,
}

/// A model as declared in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDefinition {
    pub uid: String,
    #[serde(default)]
    pub info: ModelInfo,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl ModelDefinition {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            info: ModelInfo::default(),
            collection_name: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Resolves defaults: the display name falls back to the uid, groups are stored in
    /// `groups_<uid>` and content types in a collection named after the uid.
    #[must_use]
    pub fn into_schema(self, kind: ModelKind) -> ModelSchema {
        let Self { uid, mut info, collection_name, attributes } = self;
        if info.name.trim().is_empty() {
            info.name.clone_from(&uid);
        }
        let collection_name = collection_name.unwrap_or_else(|| match kind {
            ModelKind::Group => format!("groups_{uid}"),
            ModelKind::ContentType => uid.clone(),
        });

        ModelSchema { uid, kind, info, collection_name, attributes }
    }
}

/// A registered model with all defaults resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    pub uid: String,
    pub kind: ModelKind,
    pub info: ModelInfo,
    pub collection_name: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl ModelSchema {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Capabilities of a field, including the implicit `id`.
    #[must_use]
    pub fn field_capabilities(&self, name: &str) -> Option<AttributeCapabilities> {
        if name == ID_FIELD {
            return Some(AttributeCapabilities::SCALAR);
        }
        self.attribute(name).map(Attribute::capabilities)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        name == ID_FIELD || self.attributes.contains_key(name)
    }

    /// Attributes of kind `group`, with their target uid.
    pub fn group_attributes(&self) -> impl Iterator<Item = (&str, &Attribute, &str)> {
        self.attributes.iter().filter_map(|(name, attribute)| {
            attribute.group.as_deref().map(|target| (name.as_str(), attribute, target))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_follow_kind() {
        assert!(AttributeKind::String.capabilities().contains(AttributeCapabilities::MAIN_FIELD));
        assert!(AttributeKind::Float.capabilities().contains(AttributeCapabilities::SORTABLE));
        assert!(!AttributeKind::Float.capabilities().contains(AttributeCapabilities::MAIN_FIELD));
        assert!(AttributeKind::Group.capabilities().is_empty());
        assert_eq!(AttributeKind::Richtext.capabilities(), AttributeCapabilities::SEARCHABLE);
    }

    #[test]
    fn schema_defaults_are_resolved_per_kind() {
        let group = ModelDefinition::new("somegroup")
            .attribute("name", Attribute::new(AttributeKind::String))
            .into_schema(ModelKind::Group);
        assert_eq!(group.info.name, "somegroup");
        assert_eq!(group.collection_name, "groups_somegroup");

        let content_type = ModelDefinition::new("withgroup")
            .attribute("field", Attribute::group("somegroup", false))
            .into_schema(ModelKind::ContentType);
        assert_eq!(content_type.collection_name, "withgroup");
        assert_eq!(
            content_type.group_attributes().map(|(name, _, target)| (name, target)).collect::<Vec<_>>(),
            vec![("field", "somegroup")]
        );
        assert!(content_type.has_field("id"));
        assert_eq!(content_type.field_capabilities("field"), Some(AttributeCapabilities::empty()));
    }
}
