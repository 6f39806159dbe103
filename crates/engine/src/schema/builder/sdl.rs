//! Turns SDL documents into draft type definitions, applying `extend` declarations.

use std::{collections::HashSet, sync::Arc};

use async_graphql_parser::{
    types::{self as ast, ServiceDocument, TypeSystemDefinition},
    Positioned,
};
use indexmap::{map::Entry, IndexMap};

use crate::{
    resolver::TypenameDiscriminator,
    scalars::StringScalar,
    schema::{
        DirectiveDefinition, DirectiveUsage, EnumType, EnumValue, FieldDefinition, InputObjectType,
        InputValueDefinition, InterfaceType, ObjectType, ScalarType, SchemaError, TypeDefinition, TypeRef, UnionType,
    },
};

#[derive(Default)]
pub(super) struct SchemaDraft {
    pub defined: bool,
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
    pub directives: Vec<DirectiveUsage>,
}

#[derive(Default)]
pub(super) struct Draft {
    pub types: IndexMap<String, TypeDefinition>,
    pub directives: IndexMap<String, DirectiveDefinition>,
    pub schema: SchemaDraft,
    pub errors: Vec<SchemaError>,
}

/// A parsed document and whether it holds the built-in declarations.
pub(super) struct SdlDocument {
    pub document: ServiceDocument,
    pub builtin: bool,
    /// Directives declared `repeatable`, which the parsed definitions do not tell apart.
    pub repeatable: HashSet<String>,
}

impl SdlDocument {
    pub fn parse(source: &str, builtin: bool) -> Result<Self, SchemaError> {
        let document =
            async_graphql_parser::parse_schema(source).map_err(|error| SchemaError::Parse(error.to_string()))?;

        Ok(SdlDocument {
            document,
            builtin,
            repeatable: crate::lexer::repeatable_directives(source),
        })
    }
}

impl Draft {
    /// Definitions come first, then extensions in encounter order, so that a type may be
    /// extended by a document that precedes its definition.
    pub fn ingest(documents: &[SdlDocument]) -> Self {
        let mut draft = Draft::default();

        for SdlDocument {
            document,
            builtin,
            repeatable,
        } in documents
        {
            for definition in &document.definitions {
                match definition {
                    TypeSystemDefinition::Type(ty) if !ty.node.extend => draft.add_type(ty, *builtin),
                    TypeSystemDefinition::Schema(schema) if !schema.node.extend => draft.add_schema(schema),
                    TypeSystemDefinition::Directive(directive) => {
                        let is_repeatable = repeatable.contains(directive.node.name.node.as_str());
                        draft.add_directive(directive, is_repeatable, *builtin);
                    }
                    _ => {}
                }
            }
        }

        for SdlDocument { document, builtin, .. } in documents {
            for definition in &document.definitions {
                match definition {
                    TypeSystemDefinition::Type(ty) if ty.node.extend => draft.extend_type(ty, *builtin),
                    TypeSystemDefinition::Schema(schema) if schema.node.extend => draft.extend_schema(schema),
                    _ => {}
                }
            }
        }

        draft
    }

    fn check_name(&mut self, name: &str, builtin: bool) {
        if !builtin && name.starts_with("__") {
            self.errors.push(SchemaError::ReservedName(name.to_string()));
        }
    }

    fn add_type(&mut self, ty: &Positioned<ast::TypeDefinition>, builtin: bool) {
        let name = ty.node.name.node.to_string();
        self.check_name(&name, builtin);

        let definition = self.convert_type(ty, builtin);
        match self.types.entry(name) {
            Entry::Occupied(entry) => self.errors.push(SchemaError::DuplicateType(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(definition);
            }
        }
    }

    fn extend_type(&mut self, ty: &Positioned<ast::TypeDefinition>, builtin: bool) {
        let extension = self.convert_type(ty, builtin);
        let name = extension.name().to_string();

        let Some(target) = self.types.get_mut(&name) else {
            self.errors.push(SchemaError::ExtendUndefinedType(name));
            return;
        };

        if target.kind() != extension.kind() {
            self.errors.push(SchemaError::ExtensionKindMismatch {
                type_name: name,
                actual: target.kind(),
                extension: extension.kind(),
            });
            return;
        }

        merge(target, extension, &mut self.errors);
    }

    fn add_schema(&mut self, schema: &Positioned<ast::SchemaDefinition>) {
        if self.schema.defined {
            self.errors.push(SchemaError::DuplicateSchemaDefinition);
            return;
        }
        self.schema.defined = true;
        self.extend_schema(schema);
    }

    fn extend_schema(&mut self, schema: &Positioned<ast::SchemaDefinition>) {
        let roots = [
            ("query", &schema.node.query, &mut self.schema.query),
            ("mutation", &schema.node.mutation, &mut self.schema.mutation),
            ("subscription", &schema.node.subscription, &mut self.schema.subscription),
        ];

        for (operation, declared, slot) in roots {
            let Some(declared) = declared else { continue };
            if slot.is_some() {
                self.errors.push(SchemaError::DuplicateRootOperation(operation));
            } else {
                *slot = Some(declared.node.to_string());
            }
        }

        self.schema.directives.extend(usages(&schema.node.directives));
    }

    fn add_directive(
        &mut self,
        directive: &Positioned<ast::DirectiveDefinition>,
        is_repeatable: bool,
        builtin: bool,
    ) {
        let name = directive.node.name.node.to_string();
        self.check_name(&name, builtin);

        let element = format!("@{name}");
        let arguments = self.input_values(&element, &directive.node.arguments, builtin);
        let definition = DirectiveDefinition {
            name: name.clone(),
            description: description_text(&directive.node.description),
            arguments,
            locations: directive
                .node
                .locations
                .iter()
                .map(|location| location.node.into())
                .collect(),
            is_repeatable,
            implementation: None,
        };

        match self.directives.entry(name) {
            Entry::Occupied(entry) => self
                .errors
                .push(SchemaError::DuplicateDirectiveDefinition(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(definition);
            }
        }
    }

    fn convert_type(&mut self, ty: &Positioned<ast::TypeDefinition>, builtin: bool) -> TypeDefinition {
        let name = ty.node.name.node.to_string();
        let description = description_text(&ty.node.description);
        let directives = usages(&ty.node.directives);

        match &ty.node.kind {
            ast::TypeKind::Scalar => TypeDefinition::Scalar(ScalarType {
                name,
                description,
                directives,
                implementation: Arc::new(StringScalar),
            }),
            ast::TypeKind::Object(object) => TypeDefinition::Object(ObjectType {
                fields: self.fields(&name, &object.fields, builtin),
                interfaces: self.interfaces(&name, &object.implements),
                name,
                description,
                directives,
            }),
            ast::TypeKind::Interface(interface) => TypeDefinition::Interface(InterfaceType {
                fields: self.fields(&name, &interface.fields, builtin),
                interfaces: self.interfaces(&name, &interface.implements),
                name,
                description,
                directives,
                type_resolver: Arc::new(TypenameDiscriminator),
            }),
            ast::TypeKind::Union(union) => {
                let mut members: Vec<String> = Vec::with_capacity(union.members.len());
                for member in &union.members {
                    let member = member.node.to_string();
                    if members.contains(&member) {
                        self.errors.push(SchemaError::DuplicateUnionMember {
                            union_name: name.clone(),
                            member,
                        });
                    } else {
                        members.push(member);
                    }
                }

                TypeDefinition::Union(UnionType {
                    name,
                    description,
                    directives,
                    members,
                    type_resolver: Arc::new(TypenameDiscriminator),
                })
            }
            ast::TypeKind::Enum(enum_type) => {
                let mut values = IndexMap::with_capacity(enum_type.values.len());
                for value in &enum_type.values {
                    let value_name = value.node.value.node.to_string();
                    let definition = EnumValue {
                        name: value_name.clone(),
                        description: description_text(&value.node.description),
                        directives: usages(&value.node.directives),
                    };

                    if values.insert(value_name.clone(), definition).is_some() {
                        self.errors.push(SchemaError::DuplicateEnumValue {
                            enum_name: name.clone(),
                            value: value_name,
                        });
                    }
                }

                TypeDefinition::Enum(EnumType {
                    name,
                    description,
                    directives,
                    values,
                })
            }
            ast::TypeKind::InputObject(input_object) => TypeDefinition::InputObject(InputObjectType {
                fields: self.input_values(&name, &input_object.fields, builtin),
                name,
                description,
                directives,
            }),
        }
    }

    fn fields(
        &mut self,
        owner: &str,
        fields: &[Positioned<ast::FieldDefinition>],
        builtin: bool,
    ) -> IndexMap<String, FieldDefinition> {
        let mut definitions = IndexMap::with_capacity(fields.len());

        for field in fields {
            let name = field.node.name.node.to_string();
            self.check_name(&name, builtin);

            let element = format!("{owner}.{name}");
            let mut definition = FieldDefinition::new(name.clone(), TypeRef::from(&field.node.ty.node));
            definition.description = description_text(&field.node.description);
            definition.arguments = self.input_values(&element, &field.node.arguments, builtin);
            definition.directives = usages(&field.node.directives);

            if definitions.insert(name.clone(), definition).is_some() {
                self.errors.push(SchemaError::DuplicateField {
                    type_name: owner.to_string(),
                    field: name,
                });
            }
        }

        definitions
    }

    /// Arguments of a field or directive, or fields of an input object.
    fn input_values(
        &mut self,
        owner: &str,
        values: &[Positioned<ast::InputValueDefinition>],
        builtin: bool,
    ) -> IndexMap<String, InputValueDefinition> {
        let mut definitions = IndexMap::with_capacity(values.len());

        for value in values {
            let name = value.node.name.node.to_string();
            self.check_name(&name, builtin);

            let mut definition = InputValueDefinition::new(name.clone(), TypeRef::from(&value.node.ty.node));
            definition.description = description_text(&value.node.description);
            definition.default_value = value.node.default_value.as_ref().map(|value| value.node.clone());
            definition.directives = usages(&value.node.directives);

            if definitions.insert(name.clone(), definition).is_some() {
                self.errors.push(SchemaError::DuplicateArgument {
                    owner: owner.to_string(),
                    argument: name,
                });
            }
        }

        definitions
    }

    fn interfaces(&mut self, owner: &str, implements: &[Positioned<async_graphql_value::Name>]) -> Vec<String> {
        let mut interfaces: Vec<String> = Vec::with_capacity(implements.len());

        for interface in implements {
            let interface = interface.node.to_string();
            if interfaces.contains(&interface) {
                self.errors.push(SchemaError::DuplicateInterface {
                    type_name: owner.to_string(),
                    interface,
                });
            } else {
                interfaces.push(interface);
            }
        }

        interfaces
    }
}

fn description_text(description: &Option<Positioned<String>>) -> Option<String> {
    description.as_ref().map(|description| description.node.clone())
}

pub(super) fn usages(directives: &[Positioned<ast::ConstDirective>]) -> Vec<DirectiveUsage> {
    directives
        .iter()
        .map(|directive| {
            DirectiveUsage::new(
                directive.node.name.node.to_string(),
                directive
                    .node
                    .arguments
                    .iter()
                    .map(|(name, value)| (name.node.clone(), value.node.clone()))
                    .collect(),
            )
        })
        .collect()
}

fn merge_fields<V>(
    target: &mut IndexMap<String, V>,
    extension: IndexMap<String, V>,
    mut duplicate: impl FnMut(String) -> SchemaError,
    errors: &mut Vec<SchemaError>,
) {
    for (name, value) in extension {
        match target.entry(name) {
            Entry::Occupied(entry) => errors.push(duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
}

fn merge_names(
    target: &mut Vec<String>,
    extension: Vec<String>,
    mut duplicate: impl FnMut(String) -> SchemaError,
    errors: &mut Vec<SchemaError>,
) {
    for name in extension {
        if target.contains(&name) {
            errors.push(duplicate(name));
        } else {
            target.push(name);
        }
    }
}

/// Applies an extension to a definition of the same kind.
fn merge(target: &mut TypeDefinition, extension: TypeDefinition, errors: &mut Vec<SchemaError>) {
    let type_name = target.name().to_string();

    match (target, extension) {
        (TypeDefinition::Scalar(target), TypeDefinition::Scalar(extension)) => {
            target.directives.extend(extension.directives);
        }
        (TypeDefinition::Object(target), TypeDefinition::Object(extension)) => {
            target.directives.extend(extension.directives);
            merge_names(
                &mut target.interfaces,
                extension.interfaces,
                |interface| SchemaError::DuplicateInterface {
                    type_name: type_name.clone(),
                    interface,
                },
                errors,
            );
            merge_fields(
                &mut target.fields,
                extension.fields,
                |field| SchemaError::DuplicateField {
                    type_name: type_name.clone(),
                    field,
                },
                errors,
            );
        }
        (TypeDefinition::Interface(target), TypeDefinition::Interface(extension)) => {
            target.directives.extend(extension.directives);
            merge_names(
                &mut target.interfaces,
                extension.interfaces,
                |interface| SchemaError::DuplicateInterface {
                    type_name: type_name.clone(),
                    interface,
                },
                errors,
            );
            merge_fields(
                &mut target.fields,
                extension.fields,
                |field| SchemaError::DuplicateField {
                    type_name: type_name.clone(),
                    field,
                },
                errors,
            );
        }
        (TypeDefinition::Union(target), TypeDefinition::Union(extension)) => {
            target.directives.extend(extension.directives);
            merge_names(
                &mut target.members,
                extension.members,
                |member| SchemaError::DuplicateUnionMember {
                    union_name: type_name.clone(),
                    member,
                },
                errors,
            );
        }
        (TypeDefinition::Enum(target), TypeDefinition::Enum(extension)) => {
            target.directives.extend(extension.directives);
            merge_fields(
                &mut target.values,
                extension.values,
                |value| SchemaError::DuplicateEnumValue {
                    enum_name: type_name.clone(),
                    value,
                },
                errors,
            );
        }
        (TypeDefinition::InputObject(target), TypeDefinition::InputObject(extension)) => {
            target.directives.extend(extension.directives);
            merge_fields(
                &mut target.fields,
                extension.fields,
                |field| SchemaError::DuplicateField {
                    type_name: type_name.clone(),
                    field,
                },
                errors,
            );
        }
        (target, extension) => errors.push(SchemaError::ExtensionKindMismatch {
            type_name,
            actual: target.kind(),
            extension: extension.kind(),
        }),
    }
}
