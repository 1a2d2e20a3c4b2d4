//! Lowers the syntax tree straight into LIR in one depth first pass. Every
//! node kind has a translation rule which appends instructions at the
//! context's current emission point and yields the node's value.

use self::context::{EmissionPoint, GenerationContext, Slot};
use crate::{
    diagnostics::codegen_log,
    frontend::{ast, lexer::Span},
    middle::lir::{self, FunctionId, Operand},
};

pub mod context;
mod error;
mod expression;
mod statement;

#[cfg(test)]
mod tests;

pub use self::error::{TranslationError, TranslationErrorKind};

/// Name of the synthesized function holding the top level statements
pub const ENTRY_FUNCTION_NAME: &str = "main";
pub const MODULE_NAME: &str = "main";

/// Result of translating a single node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A constant or the register holding a computed value
    Operand(Operand),
    /// Storage allocated by a variable declaration
    Slot(Slot),
    Function(FunctionId),
    /// The node produced no value (empty block, call to a `void` function)
    Empty,
}

impl Value {
    /// The operand for a node whose value is required, `span` locates the
    /// node for error reporting
    pub fn into_operand(self, span: Span) -> Result<Operand, TranslationError> {
        match self {
            Value::Operand(operand) => Ok(operand),
            Value::Slot(_) | Value::Function(_) | Value::Empty => Err(TranslationError::new(
                TranslationErrorKind::VoidValue,
                span,
            )),
        }
    }
}

pub trait Translate {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError>;
}

/// Generates a module for a whole program. The top level statements are
/// placed in a `void main()` function.
pub fn generate_code(root: &ast::Block) -> Result<lir::Module, TranslationError> {
    codegen_log!("Generating code...");

    let mut context = GenerationContext::new(MODULE_NAME);
    let main = context
        .module_mut()
        .declare_function(ENTRY_FUNCTION_NAME, lir::Type::Void, &[]);

    emit_function_body(&mut context, main, |scope| {
        root.translate(scope)?;
        Ok(())
    })?;

    codegen_log!("Code is generated.");

    Ok(context.into_module())
}

/// Creates the entry block of `function`, runs `body` in a new scope emitting
/// into that block and terminates it with a `ret`. The scope is closed even
/// when `body` fails.
fn emit_function_body(
    context: &mut GenerationContext,
    function: FunctionId,
    body: impl FnOnce(&mut GenerationContext) -> Result<(), TranslationError>,
) -> Result<(), TranslationError> {
    let block = context.module_mut().function_mut(function).create_block();
    let mut scope = context.scoped(EmissionPoint { function, block });

    body(&mut *scope)?;

    scope.push_instruction(lir::Instruction::Return { value: None });

    Ok(())
}
