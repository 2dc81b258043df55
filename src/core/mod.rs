pub mod error;
pub mod types;
pub mod value;

pub use error::{
    AccessError, CallbackError, CallbackResult, RepositoryError, Result, SessionResult,
    convert_access_error,
};
pub use types::{ItemData, NodeData, Property, PropertyValues};
pub use value::Value;
