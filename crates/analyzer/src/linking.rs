//! Turns the symbolic operands of a method body into graph edges.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::DEFAULT_SLOW_METHOD_THRESHOLD_MS;
use crate::error::{AnalysisError, Result};
use crate::model::reference::{field_signature, method_signature};
use crate::model::{
    Call, Callee, ClassUse, FieldAccess, FieldView, Instruction, InstructionRef, Invocation, Link,
    Member, MethodId, MethodUsage, MethodView, Operand, StringValue, Tags, TypeOperand,
    UnlinkedInstruction,
};
use crate::program::ProgramDatabase;
use crate::resolution::Resolver;
use crate::stats::Counters;

pub struct InstructionLinker<'a> {
    db: &'a mut ProgramDatabase,
    counters: &'a mut Counters,
    slow_threshold: Duration,
}

impl<'a> InstructionLinker<'a> {
    pub fn new(db: &'a mut ProgramDatabase, counters: &'a mut Counters) -> Self {
        Self {
            db,
            counters,
            slow_threshold: Duration::from_millis(DEFAULT_SLOW_METHOD_THRESHOLD_MS),
        }
    }

    pub fn with_slow_threshold(mut self, threshold_ms: u64) -> Self {
        self.slow_threshold = Duration::from_millis(threshold_ms);
        self
    }

    /// Links every instruction of `method`. Facts left by an earlier link of
    /// the same method are retracted first, so relinking never duplicates edges.
    pub fn link_method(&mut self, method: MethodId) -> Result<()> {
        self.db
            .method_arena
            .try_get(method)
            .map_err(|source| AnalysisError::UnknownMethod { method, source })?;
        let started = Instant::now();

        if self.db.method(method).is_linked() {
            self.retract(method);
        }

        let mut blocks = std::mem::take(&mut self.db.method_mut(method).blocks);
        for (block_index, block) in blocks.iter_mut().enumerate() {
            let block_line = block.line;
            for (index, instruction) in block.instructions.iter_mut().enumerate() {
                if instruction.line.is_none() {
                    instruction.line = block_line;
                }
                let site = InstructionRef {
                    method,
                    block: block_index as u32,
                    index: index as u32,
                };
                self.link_instruction(site, instruction);
            }
        }

        let entry = self.db.method_mut(method);
        entry.blocks = blocks;
        entry.linked = true;

        let elapsed = started.elapsed();
        if elapsed > self.slow_threshold {
            warn!(
                method = %self.db.method(method).signature(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow method linking"
            );
        }
        Ok(())
    }

    fn link_instruction(&mut self, site: InstructionRef, instruction: &mut Instruction) {
        self.counters.instructions += 1;

        let Instruction {
            opcode,
            registers,
            operand,
            ..
        } = instruction;

        match operand {
            Operand::Nop => {}
            Operand::Invoke(invocation) => self.link_invocation(site, invocation, registers),
            Operand::FieldAccess(access) => self.link_field_access(site, access),
            Operand::StringLiteral(value) => {
                self.db.strings.insert(StringValue {
                    source: site.method,
                    instruction: site,
                    value: value.clone(),
                    tags: Tags::default(),
                });
            }
            Operand::Type(TypeOperand::Object(link)) => {
                let class = Resolver::new(self.db).resolve_type_link(link);
                *link = Link::Resolved(class);

                self.db.class_mut(class).callers.push(site.method);
                self.db.call.insert(Call {
                    caller: site.method,
                    callee: Callee::Class(class),
                    instruction: site,
                });
                let fqcn = self.db.class(class).fqcn.clone();
                self.usage_mut(site.method)
                    .classes
                    .record(&fqcn, ClassUse::Site(site));
            }
            // Nothing to resolve in a primitive descriptor.
            Operand::Type(TypeOperand::Primitive(_)) => {}
            Operand::Unrecognized(text) => {
                debug!(opcode = %opcode, operand = %text, "Unrecognized operand");
                self.db.parse_errors.insert(UnlinkedInstruction {
                    method: site.method,
                    instruction: site,
                    opcode: opcode.clone(),
                    operand: text.clone(),
                });
            }
        }
    }

    fn link_invocation(
        &mut self,
        site: InstructionRef,
        invocation: &mut Invocation,
        registers: &[String],
    ) {
        if invocation.intrinsic {
            return;
        }
        let view = match &invocation.target {
            Link::Resolved(view) => *view,
            Link::Unresolved(reference) => {
                Resolver::new(self.db).resolve_method(reference, invocation.kind.is_static())
            }
        };
        invocation.target = Link::Resolved(view);

        let caller = site.method;
        self.db.method_mut(view.member).callers.push(caller);
        self.db.call.insert(Call {
            caller,
            callee: Callee::Method(view),
            instruction: site,
        });
        self.counters.method_calls += 1;

        let (fqcn, signature) = self.method_keys(view);
        let usage = self.usage_mut(caller);
        usage
            .classes
            .record(&fqcn, ClassUse::Enclosing(view.enclosing_class));
        usage.methods.record(&signature, registers.to_vec());
    }

    fn link_field_access(&mut self, site: InstructionRef, access: &mut FieldAccess) {
        let view = match &access.target {
            Link::Resolved(view) => *view,
            Link::Unresolved(reference) => Resolver::new(self.db).resolve_field(reference),
        };
        access.target = Link::Resolved(view);

        let caller = site.method;
        let field = self.db.field_mut(view.member);
        if access.is_setter() {
            field.add_setter(caller);
        } else {
            field.add_getter(caller);
        }
        field.callers.push(caller);

        self.db.call.insert(Call {
            caller,
            callee: Callee::Field(view),
            instruction: site,
        });
        self.counters.field_calls += 1;

        let (fqcn, signature) = self.field_keys(view);
        let usage = self.usage_mut(caller);
        usage
            .classes
            .record(&fqcn, ClassUse::Enclosing(view.enclosing_class));
        usage.fields.record(&signature, view);
    }

    /// Usage keys: the class declaring the member, and the member's signature
    /// as seen through the class it was reached from. The class entry records
    /// that enclosing class, so an inherited call maps declarer to subclass.
    fn method_keys(&self, view: MethodView) -> (String, String) {
        let method = self.db.method(view.member);
        let enclosing = &self.db.class(view.enclosing_class).fqcn;
        let signature = method_signature(enclosing, &method.name, &method.descriptor);
        (method.owner.clone(), signature)
    }

    fn field_keys(&self, view: FieldView) -> (String, String) {
        let field = self.db.field(view.member);
        let enclosing = &self.db.class(view.enclosing_class).fqcn;
        let signature = field_signature(enclosing, &field.name, &field.field_type);
        (field.owner.clone(), signature)
    }

    fn usage_mut(&mut self, method: MethodId) -> &mut MethodUsage {
        &mut self.db.method_mut(method).usage
    }

    /// Removes every fact recorded while `method` was last linked.
    fn retract(&mut self, method: MethodId) {
        let previous: Vec<Callee> = self
            .db
            .call
            .iter()
            .filter(|call| call.caller == method)
            .map(|call| call.callee)
            .collect();

        for callee in previous {
            match callee {
                Callee::Method(view) => {
                    self.db.method_mut(view.member).callers.retain(|&m| m != method);
                }
                Callee::Field(view) => {
                    let field = self.db.field_mut(view.member);
                    field.callers.retain(|&m| m != method);
                    field.getters.retain(|&m| m != method);
                    field.setters.retain(|&m| m != method);
                }
                Callee::Class(class) => {
                    self.db.class_mut(class).callers.retain(|&m| m != method);
                }
            }
        }

        let calls = self.db.call.retain(|call| call.caller != method);
        let strings = self.db.strings.retain(|value| value.source != method);
        self.db.parse_errors.retain(|error| error.method != method);
        self.db.method_mut(method).usage = MethodUsage::default();

        debug!(
            method = %self.db.method(method).signature(),
            calls,
            strings,
            "Retracted previous link results"
        );
    }
}
