//! A GraphQL execution and type-coercion engine.
//!
//! A [`Schema`] is built once from SDL documents plus out-of-band registrations (resolvers,
//! directive implementations, scalar implementations and type resolvers) and is then used to
//! validate, coerce and execute any number of requests:
//!
//! ```ignore
//! let schema = Schema::builder()
//!     .sdl("type Query { hello: String }")
//!     .resolver("Query.hello", resolver_fn(|_| async { Ok("world".into()) }))
//!     .finish()?;
//!
//! let response = schema.execute("{ hello }").await;
//! ```

mod coercion;
mod context;
mod directive;
mod error_coercer;
mod execution;
mod introspection;
mod lexer;
mod request;
mod resolver;
mod response;
mod scalars;
mod schema;
mod settings;
mod subscription;
pub mod validation;

pub use async_graphql_parser::{Pos, Positioned};
pub use async_graphql_value::{ConstValue, Name};
pub use context::ContextData;
pub use directive::{
    ArgumentNext, DirectiveContext, DirectiveImplementation, FieldNext, IntrospectionElement, SchemaNext,
    SubscriptionNext, ValueNext,
};
pub use error::{ErrorCode, ErrorPath, ErrorPathSegment, GraphqlError, GraphqlResult, Location};
pub use error_coercer::ErrorCoercer;
pub use request::Request;
pub use resolver::{
    resolver_fn, subscription_fn, ResolveInfo, Resolver, ResolverContext, SubscriptionResolver, TypeResolver,
    TypeResolverContext, TypenameDiscriminator,
};
pub use response::Response;
pub use scalars::{
    BooleanScalar, DateScalar, DateTimeScalar, FloatScalar, IdScalar, IntScalar, ScalarImplementation, StringScalar,
    TimeScalar,
};
pub use schema::{
    DirectiveDefinition, DirectiveLocation, DirectiveUsage, EnumType, EnumValue, FieldDefinition,
    InputObjectType, InputValueDefinition, InterfaceType, ObjectType, ScalarType, Schema, SchemaBuilder, SchemaError,
    SchemaErrors, TypeDefinition, TypeKind, TypeRef, UnionType,
};
pub use serde_json::{Map, Value};
pub use settings::{Settings, SettingsError};
