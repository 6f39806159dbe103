mod bind;
mod sdl;
mod validate;

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use self::sdl::{Draft, SdlDocument};
use super::{builtins::BUILTIN_SDL, Schema, SchemaError, SchemaErrors, SchemaInner, TypeDefinition};
use crate::{
    directive::{DirectiveImplementation, NonIntrospectable},
    error_coercer::{ErrorCoercer, IdentityErrorCoercer},
    introspection,
    resolver::{Resolver, SubscriptionResolver, TypeResolver},
    scalars::{
        BooleanScalar, DateScalar, DateTimeScalar, FloatScalar, IdScalar, IntScalar, ScalarImplementation,
        StringScalar, TimeScalar,
    },
    Settings,
};

/// Collects SDL documents and capability registrations, then bakes them into a [`Schema`].
///
/// Nothing is checked before [`SchemaBuilder::finish`], which reports every problem at once.
#[derive(Default)]
pub struct SchemaBuilder {
    sdl: Vec<String>,
    resolvers: Vec<(String, Arc<dyn Resolver>)>,
    subscriptions: Vec<(String, Arc<dyn SubscriptionResolver>)>,
    directives: Vec<(String, Arc<dyn DirectiveImplementation>)>,
    scalars: Vec<(String, Arc<dyn ScalarImplementation>)>,
    type_resolvers: Vec<(String, Arc<dyn TypeResolver>)>,
    list_concurrency: Vec<(String, bool)>,
    error_coercer: Option<Arc<dyn ErrorCoercer>>,
    settings: Settings,
}

impl SchemaBuilder {
    /// Adds an SDL document. Documents are merged in the order they were added.
    #[must_use]
    pub fn sdl(mut self, sdl: impl Into<String>) -> Self {
        self.sdl.push(sdl.into());
        self
    }

    /// Binds a resolver to a field, addressed as `Type.field`.
    #[must_use]
    pub fn resolver(mut self, coordinate: impl Into<String>, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push((coordinate.into(), Arc::new(resolver)));
        self
    }

    /// Binds an event source to a field of the subscription root, addressed as `Type.field`.
    #[must_use]
    pub fn subscription(
        mut self,
        coordinate: impl Into<String>,
        resolver: impl SubscriptionResolver + 'static,
    ) -> Self {
        self.subscriptions.push((coordinate.into(), Arc::new(resolver)));
        self
    }

    #[must_use]
    pub fn directive(
        mut self,
        name: impl Into<String>,
        implementation: impl DirectiveImplementation + 'static,
    ) -> Self {
        self.directives.push((name.into(), Arc::new(implementation)));
        self
    }

    /// Binds the coercion functions of a custom scalar, or replaces those of a built-in one.
    #[must_use]
    pub fn scalar(mut self, name: impl Into<String>, implementation: impl ScalarImplementation + 'static) -> Self {
        self.scalars.push((name.into(), Arc::new(implementation)));
        self
    }

    /// Replaces the `__typename` lookup of an interface or union.
    #[must_use]
    pub fn type_resolver(mut self, abstract_type: impl Into<String>, resolver: impl TypeResolver + 'static) -> Self {
        self.type_resolvers.push((abstract_type.into(), Arc::new(resolver)));
        self
    }

    /// Overrides [`Settings::concurrent_list_items`] for one list field.
    #[must_use]
    pub fn list_concurrency(mut self, coordinate: impl Into<String>, concurrent: bool) -> Self {
        self.list_concurrency.push((coordinate.into(), concurrent));
        self
    }

    #[must_use]
    pub fn error_coercer(mut self, coercer: impl ErrorCoercer + 'static) -> Self {
        self.error_coercer = Some(Arc::new(coercer));
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn finish(self) -> Result<Schema, SchemaErrors> {
        let mut documents = Vec::with_capacity(self.sdl.len() + 1);
        let mut errors = Vec::new();

        let sources = std::iter::once((BUILTIN_SDL, true)).chain(self.sdl.iter().map(|sdl| (sdl.as_str(), false)));
        for (source, builtin) in sources {
            match SdlDocument::parse(source, builtin) {
                Ok(document) => documents.push(document),
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            return Err(SchemaErrors(errors));
        }

        let Draft {
            mut types,
            mut directives,
            schema: mut schema_draft,
            mut errors,
        } = Draft::ingest(&documents);

        self.bind_directive_implementations(&mut directives, &mut errors);
        self.bind_scalars(&mut types, &mut errors);
        introspection::install_resolvers(&mut types);
        self.bind_fields(&mut types, &mut errors);
        self.bind_type_resolvers(&mut types, &mut errors);

        let roots = resolve_roots(
            &types,
            schema_draft.query.take(),
            schema_draft.mutation.take(),
            schema_draft.subscription.take(),
            &mut errors,
        );
        self.bind_subscriptions(&mut types, roots.as_ref().and_then(|roots| roots.2.as_deref()), &mut errors);

        validate::validate_types(&types, &directives, &mut errors);
        bind::bind_directives(&mut types, &mut directives, &mut schema_draft.directives, &mut errors);

        let Some((query_type, mutation_type, subscription_type)) = roots else {
            return Err(SchemaErrors(errors));
        };
        if !errors.is_empty() {
            return Err(SchemaErrors(errors));
        }

        if self.settings.introspection {
            if let Some(TypeDefinition::Object(query)) = types.get_mut(&query_type) {
                for field in introspection::meta_fields() {
                    query.fields.insert(field.name.clone(), field);
                }
            }
        }

        let possible_types = possible_types(&types);

        tracing::debug!(
            types = types.len(),
            directives = directives.len(),
            "schema built with query root {query_type}"
        );

        Ok(Schema(Arc::new(SchemaInner {
            types,
            directives,
            query_type,
            mutation_type,
            subscription_type,
            schema_directives: schema_draft.directives,
            possible_types,
            settings: self.settings,
            error_coercer: self.error_coercer.unwrap_or_else(|| Arc::new(IdentityErrorCoercer)),
        })))
    }

    fn bind_directive_implementations(
        &self,
        directives: &mut IndexMap<String, super::DirectiveDefinition>,
        errors: &mut Vec<SchemaError>,
    ) {
        if let Some(directive) = directives.get_mut("nonIntrospectable") {
            directive.implementation = Some(Arc::new(NonIntrospectable));
        }

        for (name, implementation) in &self.directives {
            match directives.get_mut(name) {
                Some(directive) => {
                    if directive.implementation.replace(implementation.clone()).is_some() {
                        tracing::warn!("directive @{name} registered more than once, keeping the last one");
                    }
                }
                None => errors.push(SchemaError::UnknownDirectiveImplementation(name.clone())),
            }
        }
    }

    fn bind_scalars(&self, types: &mut IndexMap<String, TypeDefinition>, errors: &mut Vec<SchemaError>) {
        let mut implementations: HashMap<&str, Arc<dyn ScalarImplementation>> = HashMap::from([
            ("Int", Arc::new(IntScalar) as Arc<dyn ScalarImplementation>),
            ("Float", Arc::new(FloatScalar)),
            ("String", Arc::new(StringScalar)),
            ("Boolean", Arc::new(BooleanScalar)),
            ("ID", Arc::new(IdScalar)),
            ("Date", Arc::new(DateScalar)),
            ("DateTime", Arc::new(DateTimeScalar)),
            ("Time", Arc::new(TimeScalar)),
        ]);

        for (name, implementation) in &self.scalars {
            match types.get(name) {
                Some(TypeDefinition::Scalar(_)) => {
                    implementations.insert(name.as_str(), implementation.clone());
                }
                _ => errors.push(SchemaError::UnknownScalarImplementation(name.clone())),
            }
        }

        for definition in types.values_mut() {
            if let TypeDefinition::Scalar(scalar) = definition {
                match implementations.get(scalar.name.as_str()) {
                    Some(implementation) => scalar.implementation = implementation.clone(),
                    None => errors.push(SchemaError::MissingScalarImplementation(scalar.name.clone())),
                }
            }
        }
    }

    fn bind_fields(&self, types: &mut IndexMap<String, TypeDefinition>, errors: &mut Vec<SchemaError>) {
        for (coordinate, resolver) in &self.resolvers {
            match field_mut(types, coordinate) {
                Some(field) => {
                    if field.resolver.replace(resolver.clone()).is_some() {
                        tracing::warn!("resolver for {coordinate} registered more than once, keeping the last one");
                    }
                }
                None => errors.push(SchemaError::UnknownResolverTarget(coordinate.clone())),
            }
        }

        for (coordinate, concurrent) in &self.list_concurrency {
            match field_mut(types, coordinate) {
                Some(field) => field.concurrent_list_items = Some(*concurrent),
                None => errors.push(SchemaError::UnknownResolverTarget(coordinate.clone())),
            }
        }
    }

    fn bind_subscriptions(
        &self,
        types: &mut IndexMap<String, TypeDefinition>,
        subscription_type: Option<&str>,
        errors: &mut Vec<SchemaError>,
    ) {
        for (coordinate, resolver) in &self.subscriptions {
            let on_root = coordinate
                .split_once('.')
                .is_some_and(|(type_name, _)| Some(type_name) == subscription_type);

            match field_mut(types, coordinate).filter(|_| on_root) {
                Some(field) => field.subscription = Some(resolver.clone()),
                None => errors.push(SchemaError::InvalidSubscriptionTarget(coordinate.clone())),
            }
        }
    }

    fn bind_type_resolvers(&self, types: &mut IndexMap<String, TypeDefinition>, errors: &mut Vec<SchemaError>) {
        for (name, resolver) in &self.type_resolvers {
            match types.get_mut(name) {
                Some(TypeDefinition::Interface(interface)) => interface.type_resolver = resolver.clone(),
                Some(TypeDefinition::Union(union)) => union.type_resolver = resolver.clone(),
                _ => errors.push(SchemaError::InvalidTypeResolverTarget(name.clone())),
            }
        }
    }
}

fn field_mut<'a>(
    types: &'a mut IndexMap<String, TypeDefinition>,
    coordinate: &str,
) -> Option<&'a mut super::FieldDefinition> {
    let (type_name, field_name) = coordinate.split_once('.')?;
    match types.get_mut(type_name)? {
        TypeDefinition::Object(object) => object.fields.get_mut(field_name),
        TypeDefinition::Interface(interface) => interface.fields.get_mut(field_name),
        _ => None,
    }
}

type Roots = (String, Option<String>, Option<String>);

/// Root operation types, declared by a `schema` definition or found by their conventional
/// names.
fn resolve_roots(
    types: &IndexMap<String, TypeDefinition>,
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
    errors: &mut Vec<SchemaError>,
) -> Option<Roots> {
    let explicit = query.is_some() || mutation.is_some() || subscription.is_some();
    let conventional = |name: &str| types.contains_key(name).then(|| name.to_string());

    let (query, mutation, subscription) = if explicit {
        (query, mutation, subscription)
    } else {
        (
            conventional("Query"),
            conventional("Mutation"),
            conventional("Subscription"),
        )
    };

    let mut valid = true;
    for (operation, name) in [
        ("query", &query),
        ("mutation", &mutation),
        ("subscription", &subscription),
    ] {
        let Some(name) = name else { continue };
        match types.get(name) {
            Some(TypeDefinition::Object(_)) => {}
            Some(_) => {
                valid = false;
                errors.push(SchemaError::RootTypeNotObject {
                    operation,
                    type_name: name.clone(),
                });
            }
            None => {
                valid = false;
                errors.push(SchemaError::UnknownType {
                    type_name: name.clone(),
                    element: "schema".to_string(),
                });
            }
        }
    }

    let Some(query) = query else {
        errors.push(SchemaError::MissingQueryType);
        return None;
    };

    valid.then_some((query, mutation, subscription))
}

/// Objects behind each interface and union, in declaration order.
fn possible_types(types: &IndexMap<String, TypeDefinition>) -> HashMap<String, Vec<String>> {
    let mut possible_types: HashMap<String, Vec<String>> = HashMap::new();

    for definition in types.values() {
        match definition {
            TypeDefinition::Union(union) => {
                possible_types.insert(union.name.clone(), union.members.clone());
            }
            TypeDefinition::Interface(interface) => {
                possible_types.entry(interface.name.clone()).or_default();
            }
            _ => {}
        }
    }

    for definition in types.values() {
        if let TypeDefinition::Object(object) = definition {
            for interface in &object.interfaces {
                possible_types
                    .entry(interface.clone())
                    .or_default()
                    .push(object.name.clone());
            }
        }
    }

    possible_types
}
