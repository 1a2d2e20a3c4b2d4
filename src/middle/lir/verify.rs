//! Structural checks run on a finished module before it is handed to a
//! backend. Types are not checked beyond call arity.

use hashbrown::HashMap;

use crate::middle::lir::{self, BlockId, FunctionId, Instruction, Operand, RegisterId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationError {
    pub function: String,
    pub block: Option<BlockId>,
    pub kind: VerificationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationErrorKind {
    NoBlocks,
    EmptyBlock,
    MissingTerminator,
    /// A `ret` followed by more instructions
    InstructionAfterReturn,
    UndefinedRegister(RegisterId),
    UndefinedFunction(FunctionId),
    /// Another function with the same name was defined first
    DuplicateFunction(FunctionId),
    ArgumentCountMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },
}

impl core::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "in function `{}`", self.function)?;

        if let Some(block) = self.block {
            write!(f, " at {block}")?;
        }

        write!(f, ": ")?;

        match &self.kind {
            VerificationErrorKind::NoBlocks => write!(f, "function has no blocks"),
            VerificationErrorKind::EmptyBlock => write!(f, "block has no instructions"),
            VerificationErrorKind::MissingTerminator => {
                write!(f, "block does not end with a return")
            }
            VerificationErrorKind::InstructionAfterReturn => {
                write!(f, "instructions found after a return")
            }
            VerificationErrorKind::UndefinedRegister(register) => {
                write!(f, "register {register} is not defined")
            }
            VerificationErrorKind::UndefinedFunction(function) => {
                write!(f, "call to unknown function {function}")
            }
            VerificationErrorKind::DuplicateFunction(first) => {
                write!(f, "function name is already defined by {first}")
            }
            VerificationErrorKind::ArgumentCountMismatch {
                callee,
                expected,
                found,
            } => write!(
                f,
                "`{callee}` expects {expected} argument(s) but {found} were passed"
            ),
        }
    }
}

pub fn verify_module(module: &lir::Module) -> Result<(), Vec<VerificationError>> {
    let mut errors = Vec::new();
    let mut defined = HashMap::new();

    for function in &module.functions {
        if let Some(first) = defined.get(function.name.as_str()) {
            errors.push(VerificationError {
                function: function.name.clone(),
                block: None,
                kind: VerificationErrorKind::DuplicateFunction(*first),
            });
        } else {
            defined.insert(function.name.as_str(), function.id);
        }

        verify_function(module, function, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn verify_function(
    module: &lir::Module,
    function: &lir::FunctionDefinition,
    errors: &mut Vec<VerificationError>,
) {
    let mut report = |block: Option<BlockId>, kind: VerificationErrorKind| {
        errors.push(VerificationError {
            function: function.name.clone(),
            block,
            kind,
        })
    };

    if function.blocks.is_empty() {
        report(None, VerificationErrorKind::NoBlocks);
    }

    for argument in &function.arguments {
        if !function.registers.contains(*argument) {
            report(None, VerificationErrorKind::UndefinedRegister(*argument));
        }
    }

    for block in &function.blocks {
        let Some(last) = block.instructions.last() else {
            report(Some(block.id), VerificationErrorKind::EmptyBlock);
            continue;
        };

        if !matches!(last, Instruction::Return { .. }) {
            report(Some(block.id), VerificationErrorKind::MissingTerminator);
        }

        let early_returns = block.instructions[..block.instructions.len() - 1]
            .iter()
            .any(|i| matches!(i, Instruction::Return { .. }));

        if early_returns {
            report(Some(block.id), VerificationErrorKind::InstructionAfterReturn);
        }

        for instruction in &block.instructions {
            for register in registers_of(instruction) {
                if !function.registers.contains(register) {
                    report(
                        Some(block.id),
                        VerificationErrorKind::UndefinedRegister(register),
                    );
                }
            }

            let Instruction::FunctionCall {
                target, arguments, ..
            } = instruction
            else {
                continue;
            };

            match module.functions.get(*target) {
                Some(callee) if callee.arguments.len() != arguments.len() => report(
                    Some(block.id),
                    VerificationErrorKind::ArgumentCountMismatch {
                        callee: callee.name.clone(),
                        expected: callee.arguments.len(),
                        found: arguments.len(),
                    },
                ),
                Some(_) => {}
                None => report(
                    Some(block.id),
                    VerificationErrorKind::UndefinedFunction(*target),
                ),
            }
        }
    }
}

/// Every register an instruction reads or writes
fn registers_of(instruction: &Instruction) -> Vec<RegisterId> {
    let operand_register = |operand: &Operand| match operand {
        Operand::Register(register) => Some(*register),
        Operand::Immediate(_) => None,
    };

    match instruction {
        Instruction::AllocStack { destination, .. } => vec![*destination],
        Instruction::LoadMem {
            destination,
            source,
        } => vec![*destination, *source],
        Instruction::StoreMem {
            destination,
            source,
        } => std::iter::once(*destination)
            .chain(operand_register(source))
            .collect(),
        Instruction::BinaryOperation {
            destination,
            lhs,
            rhs,
            ..
        } => std::iter::once(*destination)
            .chain(operand_register(lhs))
            .chain(operand_register(rhs))
            .collect(),
        Instruction::FunctionCall {
            arguments,
            destination,
            ..
        } => destination
            .iter()
            .copied()
            .chain(arguments.iter().filter_map(operand_register))
            .collect(),
        Instruction::Return { value } => value.iter().filter_map(operand_register).collect(),
    }
}
