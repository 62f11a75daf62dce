//! Entities of the program model and the edges between them.
//!
//! Every entity is owned by an arena of the [`ProgramDatabase`](crate::program::ProgramDatabase);
//! everything else refers to it through a typed index.

pub mod class;
pub mod edge;
pub mod instruction;
pub mod member;
pub mod reference;
pub mod tags;
pub mod usage;

use serde::{Deserialize, Serialize};

pub use class::{Class, Package};
pub use edge::{Call, Callee, MissingEntity, StringValue, UnlinkedInstruction};
pub use instruction::{
    AccessKind, FieldAccess, Instruction, InstructionBlock, InstructionRef, Invocation, InvokeKind,
    Operand, TypeOperand,
};
pub use member::{Field, FieldView, Member, MemberView, Method, MethodView, Modifiers, Visibility};
pub use reference::{FieldRef, MethodRef, TypeRef};
pub use tags::{Tag, TagCategory, Tags};
pub use usage::{ClassUse, MethodUsage, UsageMap};

index_vec::define_index_type! {
    pub struct ClassId = u32;
}

index_vec::define_index_type! {
    pub struct FieldId = u32;
}

index_vec::define_index_type! {
    pub struct MethodId = u32;
}

index_vec::define_index_type! {
    pub struct PackageId = u32;
}

/// A name produced by the parser that is upgraded in place once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link<R, H> {
    Unresolved(R),
    Resolved(H),
}

impl<R, H: Copy> Link<R, H> {
    pub fn resolved(&self) -> Option<H> {
        match self {
            Link::Resolved(handle) => Some(*handle),
            Link::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Link::Resolved(_))
    }
}

pub type TypeLink = Link<TypeRef, ClassId>;
pub type FieldLink = Link<FieldRef, FieldView>;
pub type MethodLink = Link<MethodRef, MethodView>;
pub type PackageLink = Link<String, PackageId>;
