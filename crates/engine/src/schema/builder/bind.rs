//! Checks directive usages against their definitions and binds their arguments and
//! implementations.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    coercion::{InputCoercer, InputSource},
    schema::{
        DirectiveDefinition, DirectiveLocation, DirectiveUsage, InputValueDefinition, SchemaError, TypeDefinition,
    },
};

struct Binder<'a> {
    types: &'a IndexMap<String, TypeDefinition>,
    directives: &'a IndexMap<String, DirectiveDefinition>,
    errors: &'a mut Vec<SchemaError>,
}

pub(super) fn bind_directives(
    types: &mut IndexMap<String, TypeDefinition>,
    directives: &mut IndexMap<String, DirectiveDefinition>,
    schema_directives: &mut [DirectiveUsage],
    errors: &mut Vec<SchemaError>,
) {
    // Arguments are coerced against a frozen copy since usages live inside the types.
    let types_snapshot = types.clone();
    let directives_snapshot = directives.clone();
    let mut binder = Binder {
        types: &types_snapshot,
        directives: &directives_snapshot,
        errors,
    };

    binder.bind(schema_directives, DirectiveLocation::Schema, "schema");

    for definition in types.values_mut() {
        let type_name = definition.name().to_string();
        let location = definition.location();
        binder.bind(definition.directives_mut(), location, &type_name);

        match definition {
            TypeDefinition::Object(object) => {
                for field in object.fields.values_mut() {
                    let element = format!("{type_name}.{}", field.name);
                    binder.bind(&mut field.directives, DirectiveLocation::FieldDefinition, &element);
                    binder.input_values(&mut field.arguments, DirectiveLocation::ArgumentDefinition, &element);
                }
            }
            TypeDefinition::Interface(interface) => {
                for field in interface.fields.values_mut() {
                    let element = format!("{type_name}.{}", field.name);
                    binder.bind(&mut field.directives, DirectiveLocation::FieldDefinition, &element);
                    binder.input_values(&mut field.arguments, DirectiveLocation::ArgumentDefinition, &element);
                }
            }
            TypeDefinition::Enum(enum_type) => {
                for value in enum_type.values.values_mut() {
                    let element = format!("{type_name}.{}", value.name);
                    binder.bind(&mut value.directives, DirectiveLocation::EnumValue, &element);
                }
            }
            TypeDefinition::InputObject(input_object) => {
                binder.input_values(
                    &mut input_object.fields,
                    DirectiveLocation::InputFieldDefinition,
                    &type_name,
                );
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Union(_) => {}
        }
    }

    for directive in directives.values_mut() {
        let element = format!("@{}", directive.name);
        binder.input_values(&mut directive.arguments, DirectiveLocation::ArgumentDefinition, &element);
    }
}

impl Binder<'_> {
    fn input_values(
        &mut self,
        values: &mut IndexMap<String, InputValueDefinition>,
        location: DirectiveLocation,
        owner: &str,
    ) {
        for value in values.values_mut() {
            let element = format!("{owner}.{}", value.name);
            self.bind(&mut value.directives, location, &element);
            self.check_default(value, &element);
        }
    }

    fn check_default(&mut self, value: &InputValueDefinition, element: &str) {
        let Some(default) = &value.default_value else {
            return;
        };

        if let Err(failures) = InputCoercer::new(self.types).coerce(&value.ty, Some(InputSource::Const(default))) {
            for failure in failures {
                self.errors.push(SchemaError::InvalidDefaultValue {
                    element: element.to_string(),
                    message: failure.to_string(),
                });
            }
        }
    }

    fn bind(&mut self, usages: &mut [DirectiveUsage], location: DirectiveLocation, element: &str) {
        let mut seen = HashSet::new();

        for usage in usages {
            let Some(definition) = self.directives.get(&usage.name) else {
                self.errors.push(SchemaError::UnknownDirective {
                    directive: usage.name.clone(),
                    element: element.to_string(),
                });
                continue;
            };

            if !definition.locations.contains(&location) {
                self.errors.push(SchemaError::MisplacedDirective {
                    directive: usage.name.clone(),
                    location,
                    element: element.to_string(),
                });
            }

            if !seen.insert(usage.name.clone()) && !definition.is_repeatable {
                self.errors.push(SchemaError::RepeatedDirective {
                    directive: usage.name.clone(),
                    element: element.to_string(),
                });
            }

            for (name, _) in &usage.raw_arguments {
                if !definition.arguments.contains_key(name.as_str()) {
                    self.errors.push(SchemaError::InvalidDirectiveArgument {
                        directive: usage.name.clone(),
                        element: element.to_string(),
                        message: format!("Unknown argument \"{name}\"."),
                    });
                }
            }

            for argument in definition.arguments.values() {
                let source = usage
                    .raw_arguments
                    .iter()
                    .find_map(|(name, value)| (name.as_str() == argument.name).then_some(InputSource::Const(value)));

                match InputCoercer::new(self.types).coerce_input_value(argument, source) {
                    Ok(Some(value)) => {
                        usage.arguments.insert(argument.name.clone(), value);
                    }
                    Ok(None) => {}
                    Err(failures) => {
                        for failure in failures {
                            self.errors.push(SchemaError::InvalidDirectiveArgument {
                                directive: usage.name.clone(),
                                element: element.to_string(),
                                message: format!("Argument \"{}\": {failure}", argument.name),
                            });
                        }
                    }
                }
            }

            usage.implementation = definition.implementation.clone();
        }
    }
}
