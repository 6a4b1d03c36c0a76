//! Attributes, value spaces and values.
//!
//! The engine treats attributes as opaque keys with a finite domain.
//! Every [`Value`] is issued by exactly one [`ValueSpace`]; the kind of
//! the space is a closed enum ([`ValueKind`]) rather than an open class
//! hierarchy, so formatting, parsing and ordering are decided by `match`.

mod definition;
mod space;
mod value;

pub use definition::Attribute;
pub use space::ValueSpace;
pub use value::{Value, ValueData, ValueKind};
