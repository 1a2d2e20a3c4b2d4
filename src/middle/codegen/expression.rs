use super::{Translate, TranslationError, TranslationErrorKind, Value, context::GenerationContext};
use crate::{
    diagnostics::codegen_log,
    frontend::ast::{BinaryOperator, BinaryOperatorKind, Expression, ExpressionKind, Identifier},
    middle::lir::{ArithmeticOperator, Immediate, Instruction, Operand, Type},
};

impl Translate for Expression {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError> {
        match &self.kind {
            ExpressionKind::IntegerLiteral(value) => {
                codegen_log!("Creating integer: {value}");
                Ok(Value::Operand(Operand::Immediate(Immediate::Int(*value))))
            }
            ExpressionKind::DoubleLiteral(value) => {
                codegen_log!("Creating double: {value}");
                Ok(Value::Operand(Operand::Immediate(Immediate::Float(*value))))
            }
            ExpressionKind::Identifier(identifier) => translate_identifier(context, identifier),
            ExpressionKind::Binary { lhs, operator, rhs } => {
                translate_binary(context, lhs, *operator, rhs)
            }
            ExpressionKind::Assignment { target, value } => {
                translate_assignment(context, target, value)
            }
            ExpressionKind::MethodCall { callee, arguments } => {
                translate_method_call(context, callee, arguments)
            }
        }
    }
}

fn undeclared_variable(identifier: &Identifier) -> TranslationError {
    TranslationError::new(
        TranslationErrorKind::UndeclaredVariable(identifier.name.clone()),
        identifier.span,
    )
}

/// Reads a variable by loading from its slot
fn translate_identifier(
    context: &mut GenerationContext,
    identifier: &Identifier,
) -> Result<Value, TranslationError> {
    codegen_log!("Creating identifier reference: {}", identifier.name);

    let slot = context
        .resolve(&identifier.name)
        .ok_or_else(|| undeclared_variable(identifier))?;

    let destination = context.create_register(slot.ty);
    context.push_instruction(Instruction::LoadMem {
        destination,
        source: slot.register,
    });

    Ok(Value::Operand(Operand::Register(destination)))
}

fn arithmetic_operator(operator: BinaryOperator) -> Result<ArithmeticOperator, TranslationError> {
    match operator.kind {
        BinaryOperatorKind::Add => Ok(ArithmeticOperator::Add),
        BinaryOperatorKind::Subtract => Ok(ArithmeticOperator::Subtract),
        BinaryOperatorKind::Multiply => Ok(ArithmeticOperator::Multiply),
        BinaryOperatorKind::Divide => Ok(ArithmeticOperator::SignedDivide),
        // TODO: lower comparisons once the LIR has a compare instruction
        BinaryOperatorKind::Equals
        | BinaryOperatorKind::NotEquals
        | BinaryOperatorKind::LessThan
        | BinaryOperatorKind::LessThanOrEqualTo
        | BinaryOperatorKind::GreaterThan
        | BinaryOperatorKind::GreaterThanOrEqualTo => Err(TranslationError::new(
            TranslationErrorKind::UnsupportedOperator(operator.kind),
            operator.span,
        )),
    }
}

fn translate_operand(
    context: &mut GenerationContext,
    expression: &Expression,
) -> Result<Operand, TranslationError> {
    expression.translate(context)?.into_operand(expression.span)
}

/// Operands are evaluated strictly left to right. The result register takes
/// the type of the left operand.
fn translate_binary(
    context: &mut GenerationContext,
    lhs: &Expression,
    operator: BinaryOperator,
    rhs: &Expression,
) -> Result<Value, TranslationError> {
    codegen_log!("Creating binary operation {}", operator.kind);

    let operator = arithmetic_operator(operator)?;

    let lhs = translate_operand(context, lhs)?;
    let rhs = translate_operand(context, rhs)?;

    let ty = context.current_function().type_of(lhs);
    let destination = context.create_register(ty);

    context.push_instruction(Instruction::BinaryOperation {
        operator,
        destination,
        lhs,
        rhs,
    });

    Ok(Value::Operand(Operand::Register(destination)))
}

/// Stores into an already declared variable. The assignment evaluates to the
/// stored value.
pub(super) fn translate_assignment(
    context: &mut GenerationContext,
    target: &Identifier,
    value: &Expression,
) -> Result<Value, TranslationError> {
    codegen_log!("Creating assignment for {}", target.name);

    let slot = context
        .resolve(&target.name)
        .ok_or_else(|| undeclared_variable(target))?;

    let source = translate_operand(context, value)?;

    context.push_instruction(Instruction::StoreMem {
        destination: slot.register,
        source,
    });

    Ok(Value::Operand(source))
}

fn translate_method_call(
    context: &mut GenerationContext,
    callee: &Identifier,
    arguments: &[Expression],
) -> Result<Value, TranslationError> {
    let Some(target) = context.module().get_function(&callee.name) else {
        return Err(TranslationError::new(
            TranslationErrorKind::UndeclaredFunction(callee.name.clone()),
            callee.span,
        ));
    };

    let arguments = arguments
        .iter()
        .map(|argument| translate_operand(context, argument))
        .collect::<Result<Vec<_>, _>>()?;

    let return_type = context.module().function(target).return_type;
    let destination = (return_type != Type::Void).then(|| context.create_register(return_type));

    context.push_instruction(Instruction::FunctionCall {
        target,
        arguments,
        destination,
    });

    codegen_log!("Creating method call: {}", callee.name);

    Ok(destination.map_or(Value::Empty, |register| {
        Value::Operand(Operand::Register(register))
    }))
}
