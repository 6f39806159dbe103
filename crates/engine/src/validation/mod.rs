//! Static checks of executable documents against a schema.
//!
//! Every rule is a [`visitor::Visitor`]; they are chained together and driven by a single walk
//! over the document, so violations come out in document order.

#[cfg(test)]
#[macro_use]
mod test_harness;

mod rules;
mod utils;
mod visitor;

use async_graphql_parser::{types::ExecutableDocument, Error as ParseError};

pub use visitor::{Rule, RuleError};
use visitor::{visit, VisitorContext, VisitorNil};

use crate::{GraphqlError, Schema};

/// Runs every validation rule over `document`.
///
/// `source` is the query text the document was parsed from. Some checks need it because the
/// parsed document no longer holds every detail of the source.
pub(crate) fn check_rules(schema: &Schema, document: &ExecutableDocument, source: Option<&str>) -> Vec<GraphqlError> {
    let mut ctx = VisitorContext::new(schema, document, source);

    let mut visitor = VisitorNil
        .with(rules::SingleFieldSubscriptions)
        .with(rules::FieldsOnCorrectType)
        .with(rules::ScalarLeafs)
        .with(rules::KnownArgumentNames)
        .with(rules::UniqueArgumentNames)
        .with(rules::ProvidedRequiredArguments)
        .with(rules::KnownTypeNames)
        .with(rules::FragmentsOnCompositeTypes)
        .with(rules::NoUnusedFragments)
        .with(rules::KnownFragmentNames)
        .with(rules::NoFragmentCycles::default())
        .with(rules::PossibleFragmentSpreads)
        .with(rules::UniqueInputFieldNames)
        .with(rules::KnownDirectives)
        .with(rules::UniqueDirectivesPerLocation)
        .with(rules::UniqueVariableNames)
        .with(rules::VariablesAreInputTypes)
        .with(rules::NoUndefinedVariables::default())
        .with(rules::NoUnusedVariables::default())
        .with(rules::VariablesInAllowedPosition::default());

    visit(&mut visitor, &mut ctx, document);

    if !ctx.errors.is_empty() {
        tracing::debug!(violations = ctx.errors.len(), "document failed validation");
    }

    ctx.errors.into_iter().map(GraphqlError::from).collect()
}

/// Some violations are detected by the parser already, which refuses the document.
pub(crate) fn parser_violation(error: &ParseError) -> Option<GraphqlError> {
    let violation = match error {
        ParseError::MultipleOperations { anonymous, operation } => RuleError::new(
            Rule::LoneAnonymousOperation,
            vec![*anonymous, *operation],
            "This anonymous operation must be the only defined operation.",
        ),
        ParseError::OperationDuplicated {
            operation,
            first,
            second,
        } => RuleError::new(
            Rule::UniqueOperationNames,
            vec![*first, *second],
            format!("There can be only one operation named \"{operation}\"."),
        ),
        ParseError::FragmentDuplicated { fragment, first, second } => RuleError::new(
            Rule::UniqueFragmentNames,
            vec![*first, *second],
            format!("There can be only one fragment named \"{fragment}\"."),
        ),
        _ => return None,
    };

    Some(violation.into())
}
