use crate::{
    errors::LoweringError,
    ir::{
        blocks::IrBlock,
        expressions::{BinaryOperator, Expression},
        metadata::QueryMetadata,
    },
};

/// Lowers every `ContextFieldExistence` expression into a null-comparison
/// the backend can render: `exists(loc)` becomes `loc != null`, where the
/// left side is a vertex-context reference carrying the location's declared
/// type from the metadata lookup.
///
/// The reference variant depends on the containing block: inside a
/// `ConstructResult`, the location check must use an `OutputContextVertex`
/// (validated to denote a whole vertex); in every other block a plain
/// `ContextField` is used. After this pass no `ContextFieldExistence` node
/// remains anywhere in the sequence.
pub fn lower_context_field_existence<M: QueryMetadata>(
    ir_blocks: &[IrBlock],
    metadata: &M,
) -> Result<Vec<IrBlock>, LoweringError> {
    let mut new_ir_blocks = Vec::with_capacity(ir_blocks.len());
    for block in ir_blocks {
        let new_block = match block {
            IrBlock::ConstructResult(_) => block
                .visit_and_update_expressions(&mut |e| lower_in_output_context(e, metadata))?,
            _ => block
                .visit_and_update_expressions(&mut |e| lower_in_global_context(e, metadata))?,
        };
        new_ir_blocks.push(new_block);
    }

    tracing::trace!(blocks = new_ir_blocks.len(), "lowered context field existence");
    Ok(new_ir_blocks)
}

fn lower_in_global_context<M: QueryMetadata>(
    expression: Expression,
    metadata: &M,
) -> Result<Expression, LoweringError> {
    match expression {
        Expression::ContextFieldExistence { location } => {
            let info = metadata.location_info(&location)?;
            Ok(Expression::binary(
                BinaryOperator::NotEqual,
                Expression::ContextField {
                    field_type: info.type_ref.clone(),
                    location,
                },
                Expression::NullLiteral,
            ))
        }
        other => Ok(other),
    }
}

fn lower_in_output_context<M: QueryMetadata>(
    expression: Expression,
    metadata: &M,
) -> Result<Expression, LoweringError> {
    match expression {
        Expression::ContextFieldExistence { location } => {
            let info = metadata.location_info(&location)?;
            let vertex = Expression::output_context_vertex(location, info.type_ref.clone())?;
            Ok(Expression::binary(
                BinaryOperator::NotEqual,
                vertex,
                Expression::NullLiteral,
            ))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        location::Location,
        metadata::{LocationInfo, QueryMetadataTable, TypeRef},
    };
    use indexmap::IndexMap;

    fn parent_location() -> Location {
        Location::new(vec!["Animal".to_string()]).navigate_to_subpath("out_Animal_ParentOf")
    }

    fn metadata_with_parent() -> QueryMetadataTable {
        let mut table = QueryMetadataTable::new();
        table.register_location(parent_location(), LocationInfo::new(TypeRef::new("Animal")));
        table
    }

    fn existence() -> Expression {
        Expression::ContextFieldExistence {
            location: parent_location(),
        }
    }

    fn contains_existence(blocks: &[IrBlock]) -> bool {
        let mut found = false;
        for block in blocks {
            block
                .visit_and_update_expressions(&mut |e| {
                    if matches!(e, Expression::ContextFieldExistence { .. }) {
                        found = true;
                    }
                    Ok(e)
                })
                .unwrap();
        }
        found
    }

    // ============================================================================
    // Variant Selection Tests
    // ============================================================================

    #[test]
    fn test_filter_existence_lowers_to_context_field_comparison() {
        let blocks = vec![IrBlock::Filter(existence())];

        let lowered = lower_context_field_existence(&blocks, &metadata_with_parent()).unwrap();
        assert_eq!(
            lowered,
            vec![IrBlock::Filter(Expression::binary(
                BinaryOperator::NotEqual,
                Expression::ContextField {
                    location: parent_location(),
                    field_type: TypeRef::new("Animal"),
                },
                Expression::NullLiteral,
            ))]
        );
    }

    #[test]
    fn test_construct_result_existence_lowers_to_output_context_vertex() {
        let mut fields = IndexMap::new();
        fields.insert("parent_exists".to_string(), existence());
        let blocks = vec![IrBlock::ConstructResult(fields)];

        let lowered = lower_context_field_existence(&blocks, &metadata_with_parent()).unwrap();
        let IrBlock::ConstructResult(new_fields) = &lowered[0] else {
            panic!("expected ConstructResult");
        };
        assert_eq!(
            new_fields["parent_exists"],
            Expression::binary(
                BinaryOperator::NotEqual,
                Expression::output_context_vertex(parent_location(), TypeRef::new("Animal"))
                    .unwrap(),
                Expression::NullLiteral,
            )
        );
    }

    // ============================================================================
    // Totality Tests
    // ============================================================================

    #[test]
    fn test_no_existence_nodes_remain_after_lowering() {
        let mut fields = IndexMap::new();
        fields.insert(
            "parent_exists".to_string(),
            Expression::TernaryConditional {
                predicate: Box::new(existence()),
                if_true: Box::new(Expression::TrueLiteral),
                if_false: Box::new(Expression::FalseLiteral),
            },
        );
        let blocks = vec![
            IrBlock::Filter(Expression::binary(
                BinaryOperator::And,
                existence(),
                Expression::TrueLiteral,
            )),
            IrBlock::ConstructResult(fields),
        ];

        assert!(contains_existence(&blocks));
        let lowered = lower_context_field_existence(&blocks, &metadata_with_parent()).unwrap();
        assert!(!contains_existence(&lowered));
    }

    #[test]
    fn test_other_expressions_pass_through_unchanged() {
        let blocks = vec![
            IrBlock::MarkLocation(parent_location()),
            IrBlock::Filter(Expression::binary(
                BinaryOperator::Equal,
                Expression::LocalField("name".to_string()),
                Expression::Variable("desired_name".to_string()),
            )),
        ];

        let lowered = lower_context_field_existence(&blocks, &metadata_with_parent()).unwrap();
        assert_eq!(lowered, blocks);
    }

    // ============================================================================
    // Failure Tests
    // ============================================================================

    #[test]
    fn test_unregistered_location_errors() {
        let blocks = vec![IrBlock::Filter(existence())];

        let result = lower_context_field_existence(&blocks, &QueryMetadataTable::new());
        assert_eq!(
            result,
            Err(LoweringError::UnregisteredLocation {
                location: parent_location()
            })
        );
    }

    #[test]
    fn test_field_location_in_output_context_errors() {
        let field_location = parent_location().navigate_to_field("name");
        let mut table = QueryMetadataTable::new();
        table.register_location(
            field_location.clone(),
            LocationInfo::new(TypeRef::new("String")),
        );

        let mut fields = IndexMap::new();
        fields.insert(
            "parent_name_exists".to_string(),
            Expression::ContextFieldExistence {
                location: field_location.clone(),
            },
        );
        let blocks = vec![IrBlock::ConstructResult(fields)];

        let result = lower_context_field_existence(&blocks, &table);
        assert_eq!(
            result,
            Err(LoweringError::FieldInVertexContext {
                location: field_location
            })
        );
    }
}
