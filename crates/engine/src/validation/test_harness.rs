use std::sync::OnceLock;

use async_graphql_parser::{parse_query, types::ExecutableDocument};

use super::visitor::{visit, RuleError, Visitor, VisitorContext};
use crate::Schema;

const TEST_SCHEMA: &str = r#"
    schema {
        query: QueryRoot
        mutation: MutationRoot
        subscription: SubscriptionRoot
    }

    directive @onQuery on QUERY
    directive @onMutation on MUTATION
    directive @onField on FIELD
    directive @onFragmentSpread on FRAGMENT_SPREAD
    directive @onInlineFragment on INLINE_FRAGMENT
    directive @onVariableDefinition on VARIABLE_DEFINITION
    directive @tagged(tag: String) repeatable on FIELD

    interface Being {
        name(surname: Boolean): String
    }

    interface Mammal {
        mother: Mammal
        father: Mammal
    }

    interface Pet implements Being {
        name(surname: Boolean): String
    }

    interface Canine implements Mammal & Being {
        name(surname: Boolean): String
        mother: Canine
        father: Canine
    }

    enum DogCommand {
        SIT
        HEEL
        DOWN
    }

    type Dog implements Being & Pet & Mammal & Canine {
        name(surname: Boolean): String
        nickname: String
        barkVolume: Int
        barks: Boolean
        doesKnowCommand(dogCommand: DogCommand): Boolean
        isHouseTrained(atOtherHomes: Boolean = true): Boolean
        isAtLocation(x: Int, y: Int): Boolean
        mother: Dog
        father: Dog
    }

    enum FurColor {
        BROWN
        BLACK
        TAN
        SPOTTED
        NO_FUR
        UNKNOWN
    }

    type Cat implements Being & Pet {
        name(surname: Boolean): String
        meows: Boolean
        meowsVolume: Int
        furColor: FurColor
    }

    union CatOrDog = Cat | Dog

    type Human implements Being {
        name(surname: Boolean): String
        pets: [Pet]
        relatives: [Human]
        iq: Int
    }

    type Alien implements Being {
        name(surname: Boolean): String
        numEyes: Int
    }

    union DogOrHuman = Dog | Human

    union HumanOrAlien = Human | Alien

    input ComplexInput {
        requiredField: Boolean!
        nonNullField: Boolean! = false
        intField: Int
        stringField: String
        booleanField: Boolean
        stringListField: [String]
    }

    type ComplicatedArgs {
        intArgField(intArg: Int): String
        nonNullIntArgField(nonNullIntArg: Int!): String
        stringArgField(stringArg: String): String
        booleanArgField(booleanArg: Boolean): String
        enumArgField(enumArg: FurColor): String
        floatArgField(floatArg: Float): String
        idArgField(idArg: ID): String
        stringListArgField(stringListArg: [String]): String
        stringListNonNullArgField(stringListNonNullArg: [String!]): String
        complexArgField(complexArg: ComplexInput): String
        multipleReqs(req1: Int!, req2: Int!): String
        nonNullFieldWithDefault(arg: Int! = 0): String
        multipleOpts(opt1: Int = 0, opt2: Int = 0): String
        multipleOptAndReq(req1: Int!, req2: Int!, opt1: Int = 0, opt2: Int = 0): String
    }

    type QueryRoot {
        human(id: ID): Human
        alien: Alien
        dog: Dog
        cat: Cat
        pet: Pet
        catOrDog: CatOrDog
        dogOrHuman: DogOrHuman
        humanOrAlien: HumanOrAlien
        complicatedArgs: ComplicatedArgs
    }

    type MutationRoot {
        testInput(input: ComplexInput): String
    }

    type SubscriptionRoot {
        newDog: Dog
        catAdded: Cat
    }
"#;

pub(crate) fn test_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| Schema::builder().sdl(TEST_SCHEMA).finish().unwrap())
}

/// Parses a test document. The parser rejects documents without an operation, so fragment-only
/// documents get a trailing `{ __typename }` query, which every rule accepts.
pub(crate) fn parse_document(source: &str) -> (ExecutableDocument, String) {
    match parse_query(source) {
        Ok(doc) => (doc, source.to_string()),
        Err(async_graphql_parser::Error::MissingOperation) => {
            let source = format!("{source}\n{{ __typename }}");
            let doc = parse_query(&source).expect("Parse error");
            (doc, source)
        }
        Err(error) => panic!("Parse error: {error}"),
    }
}

pub(crate) fn validate<'a, V, F>(doc: &'a ExecutableDocument, source: &'a str, factory: F) -> Result<(), Vec<RuleError>>
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let mut ctx = VisitorContext::new(test_schema(), doc, Some(source));
    let mut visitor = factory();
    visit(&mut visitor, &mut ctx, doc);

    if ctx.errors.is_empty() {
        Ok(())
    } else {
        Err(ctx.errors)
    }
}

pub(crate) fn expect_passes_rule_<'a, V, F>(doc: &'a ExecutableDocument, source: &'a str, factory: F)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    if let Err(errors) = validate(doc, source, factory) {
        for err in &errors {
            println!("{err}");
        }
        panic!("Expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule_<'a, V, F>(doc: &'a ExecutableDocument, source: &'a str, factory: F)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    if validate(doc, source, factory).is_ok() {
        panic!("Expected rule to fail, but no errors were found");
    }
}

/// The violations found, displayed with their locations.
pub(crate) fn rule_errors_<'a, V, F>(doc: &'a ExecutableDocument, source: &'a str, factory: F) -> Vec<String>
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    validate(doc, source, factory)
        .err()
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect()
}

macro_rules! expect_passes_rule {
    ($factory:expr, $query_source:literal $(,)?) => {
        let (doc, source) = $crate::validation::test_harness::parse_document($query_source);
        $crate::validation::test_harness::expect_passes_rule_(&doc, &source, $factory);
    };
}

macro_rules! expect_fails_rule {
    ($factory:expr, $query_source:literal $(,)?) => {
        let (doc, source) = $crate::validation::test_harness::parse_document($query_source);
        $crate::validation::test_harness::expect_fails_rule_(&doc, &source, $factory);
    };
}

macro_rules! rule_errors {
    ($factory:expr, $query_source:literal $(,)?) => {{
        let (doc, source) = $crate::validation::test_harness::parse_document($query_source);
        $crate::validation::test_harness::rule_errors_(&doc, &source, $factory)
    }};
}
