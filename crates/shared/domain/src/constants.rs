/// OpenAPI tag for system routes (health).
pub const SYSTEM_TAG: &str = "System";
/// OpenAPI tag for the content manager routes.
pub const CONTENT_MANAGER_TAG: &str = "Content Manager";

/// Identifier attribute present on every model.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Attribute names the store manages itself; schemas may not declare them.
pub const RESERVED_ATTRIBUTES: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Width of one edit layout row.
pub const LAYOUT_ROW_SIZE: u8 = 12;
