use crate::errors::LoweringError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Identifier for a position in the traversal graph. A location denotes
/// either a whole vertex or, when `field` is set, a property on that vertex.
/// Locations are immutable and compare structurally: two locations are equal
/// iff they denote the same traversal position and the same field, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path of vertex names from the query root to this position.
    pub query_path: Vec<String>,
    /// Property name, when the location refers to a field rather than the
    /// vertex itself.
    pub field: Option<String>,
    /// Revisit ordinal; bumped each time the traversal returns to the same
    /// query path, so revisits mark distinct locations.
    pub visit_counter: u32,
}

impl Location {
    pub fn new(query_path: Vec<String>) -> Self {
        Self {
            query_path,
            field: None,
            visit_counter: 1,
        }
    }

    /// The same vertex position, pointing at one of its properties.
    pub fn navigate_to_field(&self, field: impl Into<String>) -> Self {
        Self {
            query_path: self.query_path.clone(),
            field: Some(field.into()),
            visit_counter: self.visit_counter,
        }
    }

    /// The whole-vertex location underlying this one, with any field
    /// component stripped.
    pub fn at_vertex(&self) -> Self {
        Self {
            query_path: self.query_path.clone(),
            field: None,
            visit_counter: self.visit_counter,
        }
    }

    /// One traversal step deeper. Only vertex locations can be navigated
    /// from; the front end never emits a traversal out of a field.
    pub fn navigate_to_subpath(&self, child: impl Into<String>) -> Self {
        debug_assert!(
            self.field.is_none(),
            "navigate_to_subpath called on a field location: {self}"
        );
        let mut query_path = self.query_path.clone();
        query_path.push(child.into());
        Self {
            query_path,
            field: None,
            visit_counter: 1,
        }
    }

    /// A fresh location for re-entering the same query path.
    pub fn revisit(&self) -> Self {
        debug_assert!(
            self.field.is_none(),
            "revisit called on a field location: {self}"
        );
        Self {
            query_path: self.query_path.clone(),
            field: None,
            visit_counter: self.visit_counter + 1,
        }
    }

    /// The `(mark_name, field_name)` pair this location renders to. The mark
    /// name is the query path joined with `__`, with a `___<n>` suffix for
    /// revisits past the first.
    pub fn get_location_name(&self) -> (String, Option<String>) {
        let mut mark_name = self.query_path.iter().join("__");
        if self.visit_counter > 1 {
            mark_name.push_str(&format!("___{}", self.visit_counter));
        }
        (mark_name, self.field.clone())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mark_name, field_name) = self.get_location_name();
        match field_name {
            Some(field) => write!(f, "{mark_name}.{field}"),
            None => write!(f, "{mark_name}"),
        }
    }
}

/// Identifier for a folded sub-traversal's scope. Fold scopes live outside
/// the enclosing traversal's location structure: a `FoldScopeLocation` is
/// only ever used as a lookup key and is never resolved through the query
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoldScopeLocation {
    /// The vertex location at which the fold is rooted.
    pub base_location: Location,
    /// The edge field the fold traverses, e.g. `out_Animal_ParentOf`.
    pub fold_field: String,
}

impl FoldScopeLocation {
    pub fn new(base_location: Location, fold_field: impl Into<String>) -> Self {
        Self {
            base_location,
            fold_field: fold_field.into(),
        }
    }
}

impl Display for FoldScopeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base_location, self.fold_field)
    }
}

/// Checks that a string rendered into query text is a safe identifier:
/// nonempty, leading letter or underscore, alphanumeric/underscore after.
/// A violation here is an internal bug, never a user-facing error.
pub fn validate_safe_string(name: &str) -> Result<(), LoweringError> {
    let mut chars = name.chars();
    let safe = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if safe {
        Ok(())
    } else {
        Err(LoweringError::UnsafeName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animal_location() -> Location {
        Location::new(vec!["Animal".to_string()])
    }

    // ============================================================================
    // Mark Name Tests
    // ============================================================================

    #[test]
    fn test_single_step_mark_name() {
        let location = animal_location();
        assert_eq!(
            location.get_location_name(),
            ("Animal".to_string(), None)
        );
    }

    #[test]
    fn test_subpath_mark_name_joins_with_double_underscore() {
        let location = animal_location().navigate_to_subpath("out_Animal_ParentOf");
        assert_eq!(
            location.get_location_name().0,
            "Animal__out_Animal_ParentOf"
        );
    }

    #[test]
    fn test_revisit_appends_counter_suffix() {
        let location = animal_location().revisit();
        assert_eq!(location.get_location_name().0, "Animal___2");
    }

    #[test]
    fn test_first_visit_has_no_suffix() {
        let location = animal_location();
        assert!(!location.get_location_name().0.contains("___"));
    }

    #[test]
    fn test_field_location_name() {
        let location = animal_location().navigate_to_field("name");
        let (mark_name, field_name) = location.get_location_name();
        assert_eq!(mark_name, "Animal");
        assert_eq!(field_name, Some("name".to_string()));
    }

    // ============================================================================
    // Location Equality Tests
    // ============================================================================

    #[test]
    fn test_same_position_locations_are_equal() {
        assert_eq!(animal_location(), animal_location());
    }

    #[test]
    fn test_field_distinguishes_locations() {
        assert_ne!(animal_location(), animal_location().navigate_to_field("name"));
    }

    #[test]
    fn test_visit_counter_distinguishes_locations() {
        assert_ne!(animal_location(), animal_location().revisit());
    }

    #[test]
    fn test_at_vertex_strips_field() {
        let location = animal_location().navigate_to_field("name");
        assert_eq!(location.at_vertex(), animal_location());
    }

    // ============================================================================
    // Safe String Tests
    // ============================================================================

    #[test]
    fn test_safe_mark_names_pass() {
        assert!(validate_safe_string("Animal__out_Animal_ParentOf").is_ok());
        assert!(validate_safe_string("_internal").is_ok());
        assert!(validate_safe_string("Animal___2").is_ok());
    }

    #[test]
    fn test_empty_string_is_unsafe() {
        assert_eq!(
            validate_safe_string(""),
            Err(LoweringError::UnsafeName {
                name: String::new()
            })
        );
    }

    #[test]
    fn test_leading_digit_is_unsafe() {
        assert!(validate_safe_string("2Animal").is_err());
    }

    #[test]
    fn test_control_and_punctuation_are_unsafe() {
        assert!(validate_safe_string("Animal\n").is_err());
        assert!(validate_safe_string("Animal;drop").is_err());
        assert!(validate_safe_string("Animal name").is_err());
    }

    // ============================================================================
    // Display Tests
    // ============================================================================

    #[test]
    fn test_vertex_location_display() {
        assert_eq!(animal_location().to_string(), "Animal");
    }

    #[test]
    fn test_field_location_display() {
        let location = animal_location().navigate_to_field("name");
        assert_eq!(location.to_string(), "Animal.name");
    }

    #[test]
    fn test_fold_scope_location_display() {
        let fold = FoldScopeLocation::new(animal_location(), "out_Animal_ParentOf");
        assert_eq!(fold.to_string(), "Animal.out_Animal_ParentOf");
    }
}
