//! Public types for the resource cache API.

mod key;
mod resource;

pub use key::{ParameterSet, ParameterSetBuilder, ParameterValue};
pub use resource::{Resource, Validity};
