use crate::{errors::LoweringError, ir::location::Location};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt::{self, Display},
};

/// Opaque token for a type declared in the schema. The lowering passes only
/// store and compare these; interpreting them is the schema subsystem's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef(pub String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema facts known about a single location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// The declared type of the value at the location.
    pub type_ref: TypeRef,
}

impl LocationInfo {
    pub fn new(type_ref: TypeRef) -> Self {
        Self { type_ref }
    }
}

/// Read-only seam to the schema/metadata subsystem. The lookup must be total
/// over every location that can reach a `ContextFieldExistence` expression;
/// a miss means the front end registered its locations incorrectly and is
/// surfaced as an error rather than recovered from.
pub trait QueryMetadata {
    fn location_info(&self, location: &Location) -> Result<&LocationInfo, LoweringError>;
}

/// Table-backed [`QueryMetadata`] populated by the front end as it assigns
/// locations.
#[derive(Debug, Clone, Default)]
pub struct QueryMetadataTable {
    infos: HashMap<Location, LocationInfo>,
}

impl QueryMetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_location(&mut self, location: Location, info: LocationInfo) {
        self.infos.insert(location, info);
    }
}

impl QueryMetadata for QueryMetadataTable {
    fn location_info(&self, location: &Location) -> Result<&LocationInfo, LoweringError> {
        self.infos
            .get(location)
            .ok_or_else(|| LoweringError::UnregisteredLocation {
                location: location.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Lookup Tests
    // ============================================================================

    #[test]
    fn test_registered_location_resolves() {
        let location = Location::new(vec!["Animal".to_string()]);
        let mut table = QueryMetadataTable::new();
        table.register_location(location.clone(), LocationInfo::new(TypeRef::new("Animal")));

        let info = table.location_info(&location).unwrap();
        assert_eq!(info.type_ref, TypeRef::new("Animal"));
    }

    #[test]
    fn test_unregistered_location_errors() {
        let table = QueryMetadataTable::new();
        let location = Location::new(vec!["Animal".to_string()]);

        assert_eq!(
            table.location_info(&location),
            Err(LoweringError::UnregisteredLocation { location })
        );
    }

    #[test]
    fn test_field_location_is_a_distinct_key() {
        let vertex = Location::new(vec!["Animal".to_string()]);
        let field = vertex.navigate_to_field("name");
        let mut table = QueryMetadataTable::new();
        table.register_location(vertex, LocationInfo::new(TypeRef::new("Animal")));

        assert!(table.location_info(&field).is_err());
    }
}
