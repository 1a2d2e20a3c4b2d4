use std::ops::{Deref, DerefMut};

use hashbrown::HashMap;

use crate::middle::lir::{self, BlockId, FunctionId, RegisterId};

/// Where newly emitted instructions are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmissionPoint {
    pub function: FunctionId,
    pub block: BlockId,
}

/// Storage allocated for one variable: the register holding the address of
/// its stack slot and the type stored there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub register: RegisterId,
    pub ty: lir::Type,
}

/// Variables visible while emitting into one function body
#[derive(Debug)]
struct Scope {
    emission_point: EmissionPoint,
    locals: HashMap<String, Slot>,
}

/// Owns the module under construction and the stack of open scopes. Each
/// function body being translated owns exactly one scope, the innermost
/// scope is the one being emitted into.
#[derive(Debug)]
pub struct GenerationContext {
    module: lir::Module,
    scopes: Vec<Scope>,
}

impl GenerationContext {
    pub fn new(module_name: &str) -> Self {
        Self {
            module: lir::Module::new(module_name),
            scopes: Vec::new(),
        }
    }

    pub fn module(&self) -> &lir::Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut lir::Module {
        &mut self.module
    }

    pub fn into_module(self) -> lir::Module {
        assert_eq!(
            self.scope_depth(),
            0,
            "Tried to take the module while scopes are still open"
        );

        self.module
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Opens an empty scope which emits into `emission_point`. Must be paired
    /// with [`Self::exit_scope`], prefer [`Self::scoped`] which does so
    /// automatically.
    pub fn enter_scope(&mut self, emission_point: EmissionPoint) {
        self.scopes.push(Scope {
            emission_point,
            locals: HashMap::new(),
        });
    }

    /// Destroys the innermost scope along with its bindings
    pub fn exit_scope(&mut self) {
        assert!(
            !self.scopes.is_empty(),
            "Attempted to exit a scope when none are open"
        );

        self.scopes.pop();
    }

    /// Opens a scope which is closed again when the returned guard is dropped
    pub fn scoped(&mut self, emission_point: EmissionPoint) -> ScopeGuard<'_> {
        self.enter_scope(emission_point);

        ScopeGuard { context: self }
    }

    pub fn current_emission_point(&self) -> Option<EmissionPoint> {
        self.scopes.last().map(|scope| scope.emission_point)
    }

    /// Looks for a binding only within the current (most nested) scope
    pub fn resolve(&self, name: &str) -> Option<Slot> {
        self.scopes
            .last()
            .and_then(|scope| scope.locals.get(name))
            .copied()
    }

    /// Binds `name` in the current scope, replacing any previous binding
    pub fn bind(&mut self, name: &str, slot: Slot) {
        let Some(scope) = self.scopes.last_mut() else {
            panic!("Tried to bind `{name}` without an open scope");
        };

        scope.locals.insert(name.to_owned(), slot);
    }

    fn emission_point(&self) -> EmissionPoint {
        let Some(emission_point) = self.current_emission_point() else {
            panic!("Tried to emit code without an open scope");
        };

        emission_point
    }

    /// The function currently being emitted into
    pub fn current_function(&self) -> &lir::FunctionDefinition {
        self.module.function(self.emission_point().function)
    }

    pub fn create_register(&mut self, ty: lir::Type) -> RegisterId {
        let function = self.emission_point().function;

        self.module.function_mut(function).create_register(ty)
    }

    pub fn push_instruction(&mut self, instruction: lir::Instruction) {
        let EmissionPoint { function, block } = self.emission_point();

        self.module.function_mut(function).blocks[block]
            .instructions
            .push(instruction);
    }
}

/// An open scope. Derefs to the context so translation can continue through
/// the guard, and exits the scope when dropped on any path.
pub struct ScopeGuard<'ctx> {
    context: &'ctx mut GenerationContext,
}

impl Deref for ScopeGuard<'_> {
    type Target = GenerationContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.context.exit_scope();
    }
}
