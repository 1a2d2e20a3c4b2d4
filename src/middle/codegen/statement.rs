use super::{
    Translate, TranslationError, Value,
    context::{GenerationContext, Slot},
    emit_function_body,
    expression::translate_assignment,
};
use crate::{
    diagnostics::codegen_log,
    frontend::ast::{Block, FunctionDeclaration, Statement, StatementKind, VariableDeclaration},
    middle::{
        lir::{Instruction, Type},
        primitive::lower_type_name,
    },
};

impl Translate for Statement {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError> {
        match &self.kind {
            StatementKind::VariableDeclaration(declaration) => declaration.translate(context),
            StatementKind::FunctionDeclaration(function) => function.translate(context),
            StatementKind::Expression(expression) => expression.translate(context),
        }
    }
}

/// Statements are translated in order, the block evaluates to the value of
/// its last statement
impl Translate for Block {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError> {
        let mut last = Value::Empty;

        for statement in &self.statements {
            last = statement.translate(context)?;
        }

        codegen_log!("Creating block");

        Ok(last)
    }
}

impl Translate for VariableDeclaration {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError> {
        codegen_log!(
            "Creating variable declaration {} {}",
            self.ty.name,
            self.name.name
        );

        let slot = declare_local(context, self);

        if let Some(initializer) = &self.initializer {
            translate_assignment(context, &self.name, initializer)?;
        }

        Ok(Value::Slot(slot))
    }
}

/// Allocates a stack slot for the variable and binds its name in the current
/// scope, shadowing an earlier declaration of the same name
fn declare_local(context: &mut GenerationContext, declaration: &VariableDeclaration) -> Slot {
    let ty = lower_type_name(&declaration.ty.name);
    let register = context.create_register(Type::Pointer);

    context.push_instruction(Instruction::AllocStack {
        destination: register,
        ty,
    });

    let slot = Slot { register, ty };
    context.bind(&declaration.name.name, slot);

    slot
}

impl Translate for FunctionDeclaration {
    fn translate(&self, context: &mut GenerationContext) -> Result<Value, TranslationError> {
        let parameter_types = self
            .parameters
            .iter()
            .map(|parameter| lower_type_name(&parameter.ty.name))
            .collect::<Vec<_>>();
        let return_type = lower_type_name(&self.return_type.name);

        let function = context.module_mut().declare_function(
            &self.name.name,
            return_type,
            &parameter_types,
        );

        emit_function_body(context, function, |scope| {
            // Parameters are addressed like any other local. Their slots are
            // not initialized from the incoming argument registers.
            for parameter in &self.parameters {
                declare_local(scope, parameter);
            }

            self.body.translate(scope)?;

            Ok(())
        })?;

        codegen_log!("Creating function: {}", self.name.name);

        Ok(Value::Function(function))
    }
}
