//! Response envelopes of the content manager routes.

use crate::configuration::{FieldMetadata, Layouts, Settings};
use crate::formatting::{FormattedModel, FormattedSchema};
use folio_derive::api_model;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[api_model]
pub struct ModelListResponse {
    pub data: Vec<FormattedModel>,
}

/// Formatted schema merged with the stored configuration.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct ModelView {
    pub uid: String,
    pub schema: FormattedSchema,
    pub settings: Settings,
    pub metadata: BTreeMap<String, FieldMetadata>,
    pub layouts: Layouts,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct ModelResponse {
    pub data: ModelView,
}

#[api_model]
pub struct CountResponse {
    pub count: usize,
}

/// An entry with its fields, nested groups and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "server", schema(value_type = Object))]
#[serde(transparent)]
pub struct EntryDocument(pub Value);

/// Query string of the entry listing. Values stay raw so that bad input is reported
/// through the validation envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "server", into_params(parameter_in = Query))]
pub struct ListParams {
    /// Offset of the first entry
    #[serde(rename = "_start")]
    pub start: Option<String>,
    /// Page length, capped by the server
    #[serde(rename = "_limit")]
    pub limit: Option<String>,
    /// `field` or `field:ASC|DESC`
    #[serde(rename = "_sort")]
    pub sort: Option<String>,
}
