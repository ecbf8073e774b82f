use crate::{
    errors::LoweringError,
    ir::{blocks::IrBlock, location::Location},
    lowering::folds::extract_folds_from_ir_blocks,
};
use indexmap::IndexSet;
use std::collections::HashMap;

/// What the backend needs to know about one simple `@optional` scope: a
/// scope that tests a single edge's existence without expanding further
/// vertex fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleOptionalInfo {
    /// Mark name of the unique location marked inside the scope.
    pub inner_location_name: String,
    /// Direction-qualified edge field the optional traverse follows.
    pub edge_field: String,
}

/// Analyzes the `@optional` scope structure of the block sequence.
///
/// Returns `(complex_optional_roots, location_to_optional_roots)`:
/// - `complex_optional_roots`: the locations immediately preceding an
///   optional `Traverse` whose scope contains at least one nested
///   `Traverse`/`Recurse` before its `EndOptional` — scopes that expand
///   further vertex fields rather than testing a single edge;
/// - `location_to_optional_roots`: for every location marked while one or
///   more optional scopes are open, the stack of enclosing optional-root
///   locations, outermost first.
///
/// Implemented as a pair of stacks advanced in a single scan: open roots,
/// and a per-scope flag recording whether a nested traversal was seen. Fold
/// scopes are excluded up front, since fold-internal locations do not
/// participate in the enclosing optional structure.
pub fn extract_optional_location_root_info(
    ir_blocks: &[IrBlock],
) -> Result<(IndexSet<Location>, HashMap<Location, Vec<Location>>), LoweringError> {
    let mut complex_optional_roots = IndexSet::new();
    let mut location_to_optional_roots = HashMap::new();

    // Parallel stacks tracing the path of open optional scopes.
    let mut in_optional_root_locations: Vec<Location> = Vec::new();
    let mut encountered_traverse_within_optional: Vec<bool> = Vec::new();

    let (_, non_folded_ir_blocks) = extract_folds_from_ir_blocks(ir_blocks)?;

    let mut preceding_location: Option<Location> = None;
    for current_block in &non_folded_ir_blocks {
        // Any traversal under an open optional scope, including one opening
        // a nested optional, makes the innermost open scope complex.
        if matches!(
            current_block,
            IrBlock::Traverse { .. } | IrBlock::Recurse { .. }
        ) && let Some(seen_traverse) = encountered_traverse_within_optional.last_mut()
        {
            *seen_traverse = true;
        }

        match current_block {
            IrBlock::Traverse {
                optional: true,
                edge_name,
                ..
            } => {
                let root = preceding_location.clone().ok_or_else(|| {
                    LoweringError::OptionalTraverseWithoutLocation {
                        edge_name: edge_name.clone(),
                    }
                })?;
                in_optional_root_locations.push(root);
                encountered_traverse_within_optional.push(false);
            }
            IrBlock::EndOptional => {
                let seen_traverse = encountered_traverse_within_optional
                    .pop()
                    .ok_or(LoweringError::UnmatchedEndOptional)?;
                let root = in_optional_root_locations
                    .pop()
                    .ok_or(LoweringError::UnmatchedEndOptional)?;
                if seen_traverse {
                    complex_optional_roots.insert(root);
                }
            }
            IrBlock::MarkLocation(location) => {
                preceding_location = Some(location.clone());
                if !in_optional_root_locations.is_empty() {
                    location_to_optional_roots
                        .insert(location.clone(), in_optional_root_locations.clone());
                }
            }
            _ => {}
        }
    }

    tracing::trace!(
        complex_roots = complex_optional_roots.len(),
        optional_locations = location_to_optional_roots.len(),
        "extracted optional root info"
    );
    Ok((complex_optional_roots, location_to_optional_roots))
}

/// Maps each simple optional-root location to its [`SimpleOptionalInfo`].
///
/// A root is simple exactly when its scope marks a single location and
/// contains no nested traversal, i.e. it tests one edge's existence. The
/// inputs come from [`extract_optional_location_root_info`]; inverting the
/// innermost-root mapping is safe because a non-complex root has at most one
/// marked location inside it by construction.
pub fn extract_simple_optional_location_info(
    ir_blocks: &[IrBlock],
    complex_optional_roots: &IndexSet<Location>,
    location_to_optional_roots: &HashMap<Location, Vec<Location>>,
) -> Result<HashMap<Location, SimpleOptionalInfo>, LoweringError> {
    // Keep only locations whose innermost enclosing root is not complex,
    // keyed by that root.
    let simple_optional_root_to_inner_location: HashMap<&Location, &Location> =
        location_to_optional_roots
            .iter()
            .filter_map(|(inner_location, optional_roots)| {
                optional_roots.last().map(|root| (root, inner_location))
            })
            .filter(|(root, _)| !complex_optional_roots.contains(*root))
            .collect();

    let (_, non_folded_ir_blocks) = extract_folds_from_ir_blocks(ir_blocks)?;

    // Second scan pairs each simple root with its optional traverse's edge.
    let mut simple_optional_root_info = HashMap::new();
    let mut preceding_location: Option<Location> = None;
    for current_block in &non_folded_ir_blocks {
        match current_block {
            IrBlock::MarkLocation(location) => {
                preceding_location = Some(location.clone());
            }
            IrBlock::Traverse { optional: true, .. } => {
                if let Some(root) = preceding_location.as_ref()
                    && let Some(inner_location) = simple_optional_root_to_inner_location.get(root)
                    && let Some(edge_field) = current_block.field_name()
                {
                    let (inner_location_name, _) = inner_location.get_location_name();
                    simple_optional_root_info.insert(
                        root.clone(),
                        SimpleOptionalInfo {
                            inner_location_name,
                            edge_field,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    Ok(simple_optional_root_info)
}

/// Returns a copy of the sequence with every `EndOptional` block removed,
/// preserving everything else and its order. Run only after the optional
/// analyses above have consumed the markers.
pub fn remove_end_optionals(ir_blocks: &[IrBlock]) -> Vec<IrBlock> {
    ir_blocks
        .iter()
        .filter(|block| !matches!(block, IrBlock::EndOptional))
        .cloned()
        .collect()
}
