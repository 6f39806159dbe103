mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod possible_fragment_spreads;
mod provided_required_arguments;
mod scalar_leafs;
mod single_field_subscriptions;
mod unique_argument_names;
mod unique_directives_per_location;
mod unique_input_field_names;
mod unique_variable_names;
mod variables_are_input_types;
mod variables_in_allowed_position;

pub(crate) use fields_on_correct_type::FieldsOnCorrectType;
pub(crate) use fragments_on_composite_types::FragmentsOnCompositeTypes;
pub(crate) use known_argument_names::KnownArgumentNames;
pub(crate) use known_directives::KnownDirectives;
pub(crate) use known_fragment_names::KnownFragmentNames;
pub(crate) use known_type_names::KnownTypeNames;
pub(crate) use no_fragment_cycles::NoFragmentCycles;
pub(crate) use no_undefined_variables::NoUndefinedVariables;
pub(crate) use no_unused_fragments::NoUnusedFragments;
pub(crate) use no_unused_variables::NoUnusedVariables;
pub(crate) use possible_fragment_spreads::PossibleFragmentSpreads;
pub(crate) use provided_required_arguments::ProvidedRequiredArguments;
pub(crate) use scalar_leafs::ScalarLeafs;
pub(crate) use single_field_subscriptions::SingleFieldSubscriptions;
pub(crate) use unique_argument_names::UniqueArgumentNames;
pub(crate) use unique_directives_per_location::UniqueDirectivesPerLocation;
pub(crate) use unique_input_field_names::UniqueInputFieldNames;
pub(crate) use unique_variable_names::UniqueVariableNames;
pub(crate) use variables_are_input_types::VariablesAreInputTypes;
pub(crate) use variables_in_allowed_position::VariablesInAllowedPosition;
