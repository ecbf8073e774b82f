//! The lowering passes. Each pass is a pure function from a block slice
//! (plus, for the existence lowering, a metadata lookup) to a fresh block
//! sequence or derived structure. The passes are broken up into separate
//! files, grouped by general functionality.
//!
//! Passes compose in a fixed order, decided by the compiler driver:
//! filter merging and existence lowering first, the boolean optimizer after
//! existence lowering (it simplifies the comparisons that pass introduces),
//! then fold extraction and the optional-scope analyses, and EndOptional
//! removal last of all, once no analysis still needs the markers.

pub mod existence;
pub mod filters;
pub mod folds;
pub mod optionals;

pub use existence::lower_context_field_existence;
pub use filters::{merge_consecutive_filter_clauses, optimize_boolean_expression_comparisons};
pub use folds::extract_folds_from_ir_blocks;
pub use optionals::{
    SimpleOptionalInfo, extract_optional_location_root_info,
    extract_simple_optional_location_info, remove_end_optionals,
};
