//! Structural checks over the merged type definitions.

use indexmap::IndexMap;

use crate::schema::{DirectiveDefinition, FieldDefinition, InputValueDefinition, SchemaError, TypeDefinition, TypeRef};

pub(super) fn validate_types(
    types: &IndexMap<String, TypeDefinition>,
    directives: &IndexMap<String, DirectiveDefinition>,
    errors: &mut Vec<SchemaError>,
) {
    for definition in types.values() {
        let type_name = definition.name();

        match definition {
            TypeDefinition::Object(object) => {
                check_fields(types, type_name, &object.fields, errors);
                check_implementations(types, type_name, &object.fields, &object.interfaces, errors);
            }
            TypeDefinition::Interface(interface) => {
                check_fields(types, type_name, &interface.fields, errors);
                check_implementations(types, type_name, &interface.fields, &interface.interfaces, errors);
            }
            TypeDefinition::Union(union) => {
                for member in &union.members {
                    match types.get(member) {
                        None => errors.push(SchemaError::UnknownType {
                            type_name: member.clone(),
                            element: union.name.clone(),
                        }),
                        Some(TypeDefinition::Object(_)) => {}
                        Some(_) => errors.push(SchemaError::InvalidUnionMember {
                            union_name: union.name.clone(),
                            member: member.clone(),
                        }),
                    }
                }
            }
            TypeDefinition::InputObject(input_object) => {
                check_input_values(types, type_name, &input_object.fields, errors);
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
        }
    }

    for directive in directives.values() {
        check_input_values(types, &format!("@{}", directive.name), &directive.arguments, errors);
    }
}

fn check_fields(
    types: &IndexMap<String, TypeDefinition>,
    type_name: &str,
    fields: &IndexMap<String, FieldDefinition>,
    errors: &mut Vec<SchemaError>,
) {
    for field in fields.values() {
        let element = format!("{type_name}.{}", field.name);

        match types.get(field.ty.named_type()) {
            None => errors.push(SchemaError::UnknownType {
                type_name: field.ty.named_type().to_string(),
                element: element.clone(),
            }),
            Some(definition) if !definition.is_output_type() => errors.push(SchemaError::NotAnOutputType {
                element: element.clone(),
                type_name: field.ty.to_string(),
            }),
            Some(_) => {}
        }

        check_input_values(types, &element, &field.arguments, errors);
    }
}

fn check_input_values(
    types: &IndexMap<String, TypeDefinition>,
    owner: &str,
    values: &IndexMap<String, InputValueDefinition>,
    errors: &mut Vec<SchemaError>,
) {
    for value in values.values() {
        let element = format!("{owner}.{}", value.name);

        match types.get(value.ty.named_type()) {
            None => errors.push(SchemaError::UnknownType {
                type_name: value.ty.named_type().to_string(),
                element,
            }),
            Some(definition) if !definition.is_input_type() => errors.push(SchemaError::NotAnInputType {
                element,
                type_name: value.ty.to_string(),
            }),
            Some(_) => {}
        }
    }
}

fn check_implementations(
    types: &IndexMap<String, TypeDefinition>,
    type_name: &str,
    fields: &IndexMap<String, FieldDefinition>,
    interfaces: &[String],
    errors: &mut Vec<SchemaError>,
) {
    for interface_name in interfaces {
        let interface = match types.get(interface_name) {
            Some(TypeDefinition::Interface(interface)) => interface,
            Some(_) => {
                errors.push(SchemaError::NotAnInterface {
                    type_name: type_name.to_string(),
                    interface: interface_name.clone(),
                });
                continue;
            }
            None => {
                errors.push(SchemaError::UnknownType {
                    type_name: interface_name.clone(),
                    element: type_name.to_string(),
                });
                continue;
            }
        };

        for transitive in &interface.interfaces {
            if transitive != type_name && !interfaces.contains(transitive) {
                errors.push(SchemaError::MissingTransitiveInterface {
                    type_name: type_name.to_string(),
                    interface: interface_name.clone(),
                    transitive: transitive.clone(),
                });
            }
        }

        for expected in interface.fields.values() {
            let Some(field) = fields.get(&expected.name) else {
                errors.push(SchemaError::MissingInterfaceField {
                    type_name: type_name.to_string(),
                    interface: interface_name.clone(),
                    field: expected.name.clone(),
                });
                continue;
            };

            if !is_sub_type(types, &field.ty, &expected.ty) {
                errors.push(SchemaError::InvalidInterfaceFieldType {
                    type_name: type_name.to_string(),
                    interface: interface_name.clone(),
                    field: expected.name.clone(),
                    expected: expected.ty.to_string(),
                    actual: field.ty.to_string(),
                });
            }

            for argument in expected.arguments.keys() {
                if !field.arguments.contains_key(argument) {
                    errors.push(SchemaError::MissingInterfaceFieldArgument {
                        type_name: type_name.to_string(),
                        interface: interface_name.clone(),
                        field: expected.name.clone(),
                        argument: argument.clone(),
                    });
                }
            }
        }
    }
}

/// Whether a field of type `sub` can stand in for a field of type `sup`. Implementations may
/// narrow types: add non-null markers, or replace an abstract type by one of its possible
/// types.
fn is_sub_type(types: &IndexMap<String, TypeDefinition>, sub: &TypeRef, sup: &TypeRef) -> bool {
    match (sub, sup) {
        _ if sub == sup => true,
        (TypeRef::NonNull(sub), TypeRef::NonNull(sup)) => is_sub_type(types, sub, sup),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::NonNull(sub), sup) => is_sub_type(types, sub, sup),
        (TypeRef::List(sub), TypeRef::List(sup)) => is_sub_type(types, sub, sup),
        (_, TypeRef::List(_)) | (TypeRef::List(_), _) => false,
        (TypeRef::Named(sub), TypeRef::Named(sup)) => match types.get(sup.as_str()) {
            Some(TypeDefinition::Union(union)) => union.members.contains(sub),
            Some(TypeDefinition::Interface(_)) => match types.get(sub.as_str()) {
                Some(TypeDefinition::Object(object)) => object.interfaces.contains(sup),
                Some(TypeDefinition::Interface(interface)) => interface.interfaces.contains(sup),
                _ => false,
            },
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Schema;

    #[rstest]
    #[case("Pet", "Pet", true)]
    #[case("Dog", "Pet", true)]
    #[case("Dog!", "Pet", true)]
    #[case("Pet", "Pet!", false)]
    #[case("[Dog!]!", "[Pet]", true)]
    #[case("[Dog]", "[Pet!]", false)]
    #[case("Dog", "Animal", true)]
    #[case("Cat", "Animal", false)]
    #[case("Dog", "[Pet]", false)]
    fn sub_types(#[case] sub: &str, #[case] sup: &str, #[case] expected: bool) {
        let schema = Schema::builder()
            .sdl(
                r#"
                interface Pet { name: String }
                type Dog implements Pet { name: String }
                type Cat { name: String }
                union Animal = Dog
                type Query { pet: Pet, animal: Animal, cat: Cat }
                "#,
            )
            .finish()
            .unwrap();

        let sub = TypeRef::parse(sub).unwrap();
        let sup = TypeRef::parse(sup).unwrap();
        assert_eq!(is_sub_type(&schema.types, &sub, &sup), expected);
    }
}
