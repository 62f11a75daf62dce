use serde::Serialize;

use crate::model::instruction::InstructionRef;
use crate::model::tags::Tags;
use crate::model::{ClassId, FieldId, FieldView, MethodId, MethodView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Callee {
    Method(MethodView),
    Field(FieldView),
    /// Bare type use.
    Class(ClassId),
}

/// One call site: method invocation, field access or type use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Call {
    pub caller: MethodId,
    pub callee: Callee,
    pub instruction: InstructionRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringValue {
    pub source: MethodId,
    pub instruction: InstructionRef,
    pub value: String,
    pub tags: Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissingEntity {
    Class(ClassId),
    Field(FieldId),
    Method(MethodId),
}

/// Instruction left out of the graph because its operand kind is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlinkedInstruction {
    pub method: MethodId,
    pub instruction: InstructionRef,
    pub opcode: String,
    pub operand: String,
}
