pub mod constants;

mod api_error;
pub use api_error::*;

mod api_registry;
pub use api_registry::*;

mod field_match;

mod json_serializer;
pub use json_serializer::*;

mod serializer;
pub use serializer::*;
