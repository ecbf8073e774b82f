use crate::{
    errors::LoweringError,
    ir::{blocks::IrBlock, location::FoldScopeLocation},
};
use indexmap::IndexMap;

/// Extracts all fold scopes from the block sequence.
///
/// Returns `(folds, remaining_ir_blocks)`:
/// - `folds` maps each `FoldScopeLocation` to the blocks strictly between
///   its `Fold` and `Unfold` markers, exclusive of both, in encounter order;
/// - `remaining_ir_blocks` is the sequence outside any fold scope, with fold
///   scopes cut out entirely.
///
/// Folds do not nest: a `Fold` while a fold scope is open, or an `Unfold`
/// while none is, is a structural-invariant violation. The optional-scope
/// analyses run on `remaining_ir_blocks`, since fold-internal locations are
/// not part of the enclosing traversal's optional structure.
pub fn extract_folds_from_ir_blocks(
    ir_blocks: &[IrBlock],
) -> Result<(IndexMap<FoldScopeLocation, Vec<IrBlock>>, Vec<IrBlock>), LoweringError> {
    let mut folds = IndexMap::new();
    let mut remaining_ir_blocks = Vec::new();
    let mut current_folded_blocks = Vec::new();
    let mut in_fold_location: Option<FoldScopeLocation> = None;

    for block in ir_blocks {
        match block {
            IrBlock::Fold(fold_scope_location) => {
                if in_fold_location.is_some() {
                    return Err(LoweringError::FoldWithinFold {
                        fold: fold_scope_location.clone(),
                    });
                }
                in_fold_location = Some(fold_scope_location.clone());
            }
            IrBlock::Unfold => {
                let fold = in_fold_location
                    .take()
                    .ok_or(LoweringError::UnmatchedUnfold)?;
                folds.insert(fold, std::mem::take(&mut current_folded_blocks));
            }
            _ => {
                if in_fold_location.is_some() {
                    current_folded_blocks.push(block.clone());
                } else {
                    remaining_ir_blocks.push(block.clone());
                }
            }
        }
    }

    Ok((folds, remaining_ir_blocks))
}
