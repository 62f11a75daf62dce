//! Total symbol resolution against the accumulated program database.
//!
//! Every lookup returns a canonical entity. References that match nothing
//! known produce placeholders tagged `missing`, so edges built from the
//! result are always well-formed.

pub mod inheritance;
pub mod kind;
pub mod missing;
pub mod resolver;


pub use kind::{FieldKind, MemberKind, MemberReference, MethodKind};
pub use missing::{create_missing_class, create_missing_field, create_missing_method};
pub use resolver::Resolver;
