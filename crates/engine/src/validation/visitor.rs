use std::fmt;

use async_graphql_parser::{
    types::{
        Directive, ExecutableDocument, Field, FragmentDefinition, FragmentSpread, InlineFragment,
        OperationDefinition, OperationType, Selection, SelectionSet, VariableDefinition,
    },
    Pos, Positioned,
};
use async_graphql_value::{Name, Value};

use crate::{
    schema::{DirectiveDefinition, DirectiveLocation, FieldDefinition, InputValueDefinition, TypeDefinition, TypeRef},
    ErrorCode, GraphqlError, Schema,
};

/// The rule a violation comes from, named after the section of the GraphQL specification
/// (June 2018) defining it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
pub enum Rule {
    UniqueOperationNames,
    LoneAnonymousOperation,
    SingleFieldSubscriptions,
    FieldsOnCorrectType,
    ScalarLeafs,
    KnownArgumentNames,
    UniqueArgumentNames,
    ProvidedRequiredArguments,
    UniqueFragmentNames,
    KnownTypeNames,
    FragmentsOnCompositeTypes,
    NoUnusedFragments,
    KnownFragmentNames,
    NoFragmentCycles,
    PossibleFragmentSpreads,
    UniqueInputFieldNames,
    KnownDirectives,
    UniqueDirectivesPerLocation,
    UniqueVariableNames,
    VariablesAreInputTypes,
    NoUndefinedVariables,
    NoUnusedVariables,
    VariablesInAllowedPosition,
}

impl Rule {
    pub fn section(self) -> &'static str {
        match self {
            Rule::UniqueOperationNames => "5.2.1.1",
            Rule::LoneAnonymousOperation => "5.2.2.1",
            Rule::SingleFieldSubscriptions => "5.2.3.1",
            Rule::FieldsOnCorrectType => "5.3.1",
            Rule::ScalarLeafs => "5.3.3",
            Rule::KnownArgumentNames => "5.4.1",
            Rule::UniqueArgumentNames => "5.4.2",
            Rule::ProvidedRequiredArguments => "5.4.2.1",
            Rule::UniqueFragmentNames => "5.5.1.1",
            Rule::KnownTypeNames => "5.5.1.2",
            Rule::FragmentsOnCompositeTypes => "5.5.1.3",
            Rule::NoUnusedFragments => "5.5.1.4",
            Rule::KnownFragmentNames => "5.5.2.1",
            Rule::NoFragmentCycles => "5.5.2.2",
            Rule::PossibleFragmentSpreads => "5.5.2.3",
            Rule::UniqueInputFieldNames => "5.6.3",
            Rule::KnownDirectives => "5.7.1",
            Rule::UniqueDirectivesPerLocation => "5.7.3",
            Rule::UniqueVariableNames => "5.8.1",
            Rule::VariablesAreInputTypes => "5.8.2",
            Rule::NoUndefinedVariables => "5.8.3",
            Rule::NoUnusedVariables => "5.8.4",
            Rule::VariablesInAllowedPosition => "5.8.5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleError {
    pub rule: Rule,
    pub locations: Vec<Pos>,
    pub message: String,
}

impl RuleError {
    pub(crate) fn new(rule: Rule, locations: Vec<Pos>, message: impl Into<String>) -> Self {
        RuleError {
            rule,
            locations,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, loc) in self.locations.iter().enumerate() {
            if idx == 0 {
                write!(f, "[")?;
            } else {
                write!(f, ", ")?;
            }

            write!(f, "{}:{}", loc.line, loc.column)?;

            if idx == self.locations.len() - 1 {
                write!(f, "] ")?;
            }
        }

        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RuleError {}

impl From<RuleError> for GraphqlError {
    fn from(error: RuleError) -> Self {
        let rule: &'static str = error.rule.into();
        GraphqlError::new(error.message, ErrorCode::OperationValidationError)
            .with_locations(error.locations)
            .with_extension("rule", rule)
            .with_extension("spec", "June 2018")
            .with_extension("tag", error.rule.section())
    }
}

pub(crate) struct VisitorContext<'a> {
    pub schema: &'a Schema,
    pub document: &'a ExecutableDocument,
    /// Text of the document, needed by checks on details the parser does not keep.
    pub source: Option<&'a str>,
    pub errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a TypeDefinition>>,
}

impl<'a> VisitorContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a ExecutableDocument, source: Option<&'a str>) -> Self {
        VisitorContext {
            schema,
            document,
            source,
            errors: Vec::new(),
            type_stack: Vec::new(),
        }
    }

    pub fn report_error(&mut self, rule: Rule, locations: Vec<Pos>, message: impl Into<String>) {
        self.errors.push(RuleError::new(rule, locations, message));
    }

    pub fn with_type(&mut self, ty: Option<&'a TypeDefinition>, f: impl FnOnce(&mut VisitorContext<'a>)) {
        self.type_stack.push(ty);
        f(self);
        self.type_stack.pop();
    }

    /// The type owning the selections being visited, `None` when it is unknown.
    pub fn current_type(&self) -> Option<&'a TypeDefinition> {
        self.type_stack.last().copied().flatten()
    }

    pub fn fragment(&self, name: &str) -> Option<&'a Positioned<FragmentDefinition>> {
        self.document.fragments.get(name)
    }
}

/// What an argument belongs to.
#[derive(Clone, Copy)]
pub(crate) enum ArgumentOwner<'a> {
    Field {
        parent_type: &'a str,
        field: &'a FieldDefinition,
    },
    Directive(&'a DirectiveDefinition),
    Unknown,
}

impl<'a> ArgumentOwner<'a> {
    pub fn argument(&self, name: &str) -> Option<&'a InputValueDefinition> {
        match self {
            ArgumentOwner::Field { field, .. } => field.arguments.get(name),
            ArgumentOwner::Directive(directive) => directive.arguments.get(name),
            ArgumentOwner::Unknown => None,
        }
    }
}

/// A value appearing where an input of `expected` type is accepted.
#[derive(Clone, Copy)]
pub(crate) struct InputPosition<'a> {
    pub pos: Pos,
    pub expected: Option<&'a TypeRef>,
    /// The location provides a default value when nothing is given.
    pub has_default: bool,
}

pub(crate) trait Visitor<'a> {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a ExecutableDocument) {}
    fn exit_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a ExecutableDocument) {}

    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable_definition: &'a Positioned<VariableDefinition>,
    ) {
    }

    /// Called once per list of directives, before each of them is visited.
    fn enter_directives(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directives: &'a [Positioned<Directive>],
        _location: DirectiveLocation,
    ) {
    }
    fn enter_directive(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directive: &'a Positioned<Directive>,
        _location: DirectiveLocation,
    ) {
    }

    fn enter_argument(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _owner: ArgumentOwner<'a>,
        _name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
    }

    fn enter_input_value(&mut self, _ctx: &mut VisitorContext<'a>, _position: InputPosition<'a>, _value: &'a Value) {}

    fn enter_selection_set(&mut self, _ctx: &mut VisitorContext<'a>, _selection_set: &'a Positioned<SelectionSet>) {}

    /// `ctx.current_type()` is the parent type of the field.
    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {}
    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {}

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, _spread: &'a Positioned<FragmentSpread>) {}

    /// `ctx.current_type()` is the type the fragment is spread into.
    fn enter_inline_fragment(&mut self, _ctx: &mut VisitorContext<'a>, _fragment: &'a Positioned<InlineFragment>) {}
}

pub(crate) struct VisitorNil;

impl VisitorNil {
    pub fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

impl Visitor<'_> for VisitorNil {}

/// Runs `B` and then `A`, so that visitors run in the order they were added.
pub(crate) struct VisitorCons<A, B>(A, B);

impl<A, B> VisitorCons<A, B> {
    pub fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

impl<'a, A, B> Visitor<'a> for VisitorCons<A, B>
where
    A: Visitor<'a>,
    B: Visitor<'a>,
{
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        self.1.enter_document(ctx, doc);
        self.0.enter_document(ctx, doc);
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        self.1.exit_document(ctx, doc);
        self.0.exit_document(ctx, doc);
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.1.enter_operation_definition(ctx, name, operation);
        self.0.enter_operation_definition(ctx, name, operation);
    }

    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.1.exit_operation_definition(ctx, name, operation);
        self.0.exit_operation_definition(ctx, name, operation);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.1.enter_fragment_definition(ctx, name, fragment);
        self.0.enter_fragment_definition(ctx, name, fragment);
    }

    fn exit_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.1.exit_fragment_definition(ctx, name, fragment);
        self.0.exit_fragment_definition(ctx, name, fragment);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        self.1.enter_variable_definition(ctx, variable_definition);
        self.0.enter_variable_definition(ctx, variable_definition);
    }

    fn enter_directives(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directives: &'a [Positioned<Directive>],
        location: DirectiveLocation,
    ) {
        self.1.enter_directives(ctx, directives, location);
        self.0.enter_directives(ctx, directives, location);
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
        location: DirectiveLocation,
    ) {
        self.1.enter_directive(ctx, directive, location);
        self.0.enter_directive(ctx, directive, location);
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        owner: ArgumentOwner<'a>,
        name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        self.1.enter_argument(ctx, owner, name, value);
        self.0.enter_argument(ctx, owner, name, value);
    }

    fn enter_input_value(&mut self, ctx: &mut VisitorContext<'a>, position: InputPosition<'a>, value: &'a Value) {
        self.1.enter_input_value(ctx, position, value);
        self.0.enter_input_value(ctx, position, value);
    }

    fn enter_selection_set(&mut self, ctx: &mut VisitorContext<'a>, selection_set: &'a Positioned<SelectionSet>) {
        self.1.enter_selection_set(ctx, selection_set);
        self.0.enter_selection_set(ctx, selection_set);
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        self.1.enter_field(ctx, field);
        self.0.enter_field(ctx, field);
    }

    fn exit_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        self.1.exit_field(ctx, field);
        self.0.exit_field(ctx, field);
    }

    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        self.1.enter_fragment_spread(ctx, spread);
        self.0.enter_fragment_spread(ctx, spread);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a Positioned<InlineFragment>) {
        self.1.enter_inline_fragment(ctx, fragment);
        self.0.enter_inline_fragment(ctx, fragment);
    }
}

enum Definition<'a> {
    Operation(Option<&'a Name>, &'a Positioned<OperationDefinition>),
    Fragment(&'a Name, &'a Positioned<FragmentDefinition>),
}

impl Definition<'_> {
    fn pos(&self) -> Pos {
        match self {
            Definition::Operation(_, operation) => operation.pos,
            Definition::Fragment(_, fragment) => fragment.pos,
        }
    }
}

/// Walks the document, operations and fragments in source order.
pub(crate) fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
    v.enter_document(ctx, doc);

    let mut definitions = doc
        .operations
        .iter()
        .map(|(name, operation)| Definition::Operation(name, operation))
        .chain(
            doc.fragments
                .iter()
                .map(|(name, fragment)| Definition::Fragment(name, fragment)),
        )
        .collect::<Vec<_>>();
    definitions.sort_by_key(|definition| (definition.pos().line, definition.pos().column));

    for definition in definitions {
        match definition {
            Definition::Operation(name, operation) => visit_operation_definition(v, ctx, name, operation),
            Definition::Fragment(name, fragment) => visit_fragment_definition(v, ctx, name, fragment),
        }
    }

    v.exit_document(ctx, doc);
}

fn visit_operation_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    name: Option<&'a Name>,
    operation: &'a Positioned<OperationDefinition>,
) {
    let schema = ctx.schema;
    let root = schema
        .root_type_name(operation.node.ty)
        .and_then(|name| schema.type_definition(name));
    let location = match operation.node.ty {
        OperationType::Query => DirectiveLocation::Query,
        OperationType::Mutation => DirectiveLocation::Mutation,
        OperationType::Subscription => DirectiveLocation::Subscription,
    };

    ctx.with_type(root, |ctx| {
        v.enter_operation_definition(ctx, name, operation);

        for variable_definition in &operation.node.variable_definitions {
            v.enter_variable_definition(ctx, variable_definition);
            visit_directives(
                v,
                ctx,
                &variable_definition.node.directives,
                DirectiveLocation::VariableDefinition,
            );
        }

        visit_directives(v, ctx, &operation.node.directives, location);
        visit_selection_set(v, ctx, &operation.node.selection_set);
        v.exit_operation_definition(ctx, name, operation);
    });
}

fn visit_fragment_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    name: &'a Name,
    fragment: &'a Positioned<FragmentDefinition>,
) {
    let schema = ctx.schema;
    let ty = schema.type_definition(&fragment.node.type_condition.node.on.node);

    ctx.with_type(ty, |ctx| {
        v.enter_fragment_definition(ctx, name, fragment);
        visit_directives(v, ctx, &fragment.node.directives, DirectiveLocation::FragmentDefinition);
        visit_selection_set(v, ctx, &fragment.node.selection_set);
        v.exit_fragment_definition(ctx, name, fragment);
    });
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    selection_set: &'a Positioned<SelectionSet>,
) {
    v.enter_selection_set(ctx, selection_set);

    for selection in &selection_set.node.items {
        match &selection.node {
            Selection::Field(field) => visit_field(v, ctx, field),
            Selection::FragmentSpread(spread) => {
                v.enter_fragment_spread(ctx, spread);
                visit_directives(v, ctx, &spread.node.directives, DirectiveLocation::FragmentSpread);
            }
            Selection::InlineFragment(fragment) => {
                v.enter_inline_fragment(ctx, fragment);

                let schema = ctx.schema;
                let ty = match &fragment.node.type_condition {
                    Some(condition) => schema.type_definition(&condition.node.on.node),
                    None => ctx.current_type(),
                };

                ctx.with_type(ty, |ctx| {
                    visit_directives(v, ctx, &fragment.node.directives, DirectiveLocation::InlineFragment);
                    visit_selection_set(v, ctx, &fragment.node.selection_set);
                });
            }
        }
    }
}

fn visit_field<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
    v.enter_field(ctx, field);

    let schema = ctx.schema;
    let parent = ctx.current_type();
    let owner = match parent.and_then(|parent| Some((parent.name(), parent.field(&field.node.name.node)?))) {
        Some((parent_type, definition)) => ArgumentOwner::Field {
            parent_type,
            field: definition,
        },
        None => ArgumentOwner::Unknown,
    };

    visit_arguments(v, ctx, owner, &field.node.arguments);

    let field_type = match owner {
        ArgumentOwner::Field { field, .. } => schema.type_definition(field.ty.named_type()),
        _ => None,
    };

    ctx.with_type(field_type, |ctx| {
        visit_directives(v, ctx, &field.node.directives, DirectiveLocation::Field);
        visit_selection_set(v, ctx, &field.node.selection_set);
    });

    v.exit_field(ctx, field);
}

fn visit_arguments<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    owner: ArgumentOwner<'a>,
    arguments: &'a [(Positioned<Name>, Positioned<Value>)],
) {
    for (name, value) in arguments {
        v.enter_argument(ctx, owner, name, value);

        let definition = owner.argument(&name.node);
        let position = InputPosition {
            pos: value.pos,
            expected: definition.map(|argument| &argument.ty),
            has_default: definition.is_some_and(|argument| argument.default_value.is_some()),
        };
        visit_input_value(v, ctx, position, &value.node);
    }
}

fn visit_input_value<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    position: InputPosition<'a>,
    value: &'a Value,
) {
    v.enter_input_value(ctx, position, value);

    match value {
        Value::List(items) => {
            let expected = match position.expected.map(TypeRef::nullable) {
                Some(TypeRef::List(item)) => Some(item.as_ref()),
                _ => None,
            };

            for item in items {
                let position = InputPosition {
                    expected,
                    has_default: false,
                    ..position
                };
                visit_input_value(v, ctx, position, item);
            }
        }
        Value::Object(fields) => {
            let schema = ctx.schema;
            let input_object = match position.expected.map(TypeRef::nullable) {
                Some(TypeRef::Named(name)) => match schema.type_definition(name) {
                    Some(TypeDefinition::InputObject(input_object)) => Some(input_object),
                    _ => None,
                },
                _ => None,
            };

            for (name, value) in fields {
                let field = input_object.and_then(|input_object| input_object.fields.get(name.as_str()));
                let position = InputPosition {
                    expected: field.map(|field| &field.ty),
                    has_default: field.is_some_and(|field| field.default_value.is_some()),
                    ..position
                };
                visit_input_value(v, ctx, position, value);
            }
        }
        _ => {}
    }
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    directives: &'a [Positioned<Directive>],
    location: DirectiveLocation,
) {
    v.enter_directives(ctx, directives, location);

    for directive in directives {
        v.enter_directive(ctx, directive, location);

        let schema = ctx.schema;
        let owner = schema
            .directive(&directive.node.name.node)
            .map_or(ArgumentOwner::Unknown, ArgumentOwner::Directive);
        visit_arguments(v, ctx, owner, &directive.node.arguments);
    }
}
