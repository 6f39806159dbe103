//! Conversion of literals and variable values into internal values.
//!
//! Input coercion runs in two passes. The first one is synchronous and purely structural:
//! it checks a source against a type and produces a JSON value or a list of located
//! failures. The second one is asynchronous and runs the `on_post_input_coercion` directive
//! hooks over the coerced value, see [`crate::execution`].

mod depth;
mod error;
mod input;
mod variables;

pub(crate) use depth::check_input_depth;
pub(crate) use error::InputValueError;
pub(crate) use input::{InputCoercer, InputSource};
pub(crate) use variables::coerce_variables;
