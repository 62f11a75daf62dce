use serde::{Deserialize, Serialize};

use crate::model::{FieldLink, FieldRef, Link, MethodId, MethodLink, MethodRef, TypeLink, TypeRef};

/// Straight-line group of instructions, in program order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionBlock {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    pub instructions: Vec<Instruction>,
}

impl InstructionBlock {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            label: None,
            line: None,
            instructions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: String,
    /// Result and argument registers, in operand order.
    #[serde(default)]
    pub registers: Vec<String>,
    pub operand: Operand,
    #[serde(default)]
    pub line: Option<u32>,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>, operand: Operand) -> Self {
        Self {
            opcode: opcode.into(),
            registers: Vec::new(),
            operand,
            line: None,
        }
    }

    pub fn with_registers<I, S>(mut self, registers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registers = registers.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_nop(&self) -> bool {
        matches!(self.operand, Operand::Nop)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// No symbolic operand: arithmetic, moves, branches, returns.
    Nop,
    Invoke(Invocation),
    FieldAccess(FieldAccess),
    StringLiteral(String),
    /// Bare type use: `new-instance`, `check-cast`, `instance-of`, array element types.
    Type(TypeOperand),
    /// Operand text the parser could not classify.
    Unrecognized(String),
}

impl Operand {
    pub fn invoke(kind: InvokeKind, target: MethodRef) -> Self {
        Operand::Invoke(Invocation {
            kind,
            intrinsic: false,
            target: Link::Unresolved(target),
        })
    }

    pub fn field(kind: AccessKind, is_static: bool, target: FieldRef) -> Self {
        Operand::FieldAccess(FieldAccess {
            kind,
            is_static,
            target: Link::Unresolved(target),
        })
    }

    pub fn type_use(name: impl Into<String>) -> Self {
        Operand::Type(TypeOperand::Object(Link::Unresolved(TypeRef::new(name))))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Operand::StringLiteral(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvokeKind {
    Virtual,
    Super,
    Direct,
    Static,
    Interface,
    Polymorphic,
    Custom,
}

impl InvokeKind {
    pub fn is_static(self) -> bool {
        self == InvokeKind::Static
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Invocation {
    pub kind: InvokeKind,
    /// Language intrinsic with no callee worth tracking.
    #[serde(default)]
    pub intrinsic: bool,
    pub target: MethodLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Get,
    Put,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldAccess {
    pub kind: AccessKind,
    #[serde(default)]
    pub is_static: bool,
    pub target: FieldLink,
}

impl FieldAccess {
    pub fn is_setter(&self) -> bool {
        self.kind == AccessKind::Put
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeOperand {
    Object(TypeLink),
    /// Primitive descriptor such as `I` or `[J`; nothing to resolve.
    Primitive(String),
}

/// Position of an instruction inside a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionRef {
    pub method: MethodId,
    pub block: u32,
    pub index: u32,
}
