//! Type inference
//!
//! Gives every variable a scalar type and every function a return type, or
//! marks it as a procedure. Runs in four steps:
//!
//! 1. a program pass over the top-level statements (function bodies excluded)
//! 2. a provisional pass over each function body, so that arguments at call
//!    sites inside functions can be typed
//! 3. one pass per function, in source order, with parameter types taken
//!    from the first call site that yields a concrete argument type
//! 4. a retry of the program variables still unresolved, now that the
//!    function return types are known
//!
//! Declared types always win over inferred ones.

use std::collections::{HashMap, HashSet};

use super::expr::{find_calls, infer_type, TypeEnv};
use super::visit::{walk_stmt, walk_stmts, Visitor};
use super::{SymbolTable, Variable};
use crate::errors::SourceSpan;
use crate::parser::{Ast, Expr, Function, ScalarType, Stmt, StmtKind};
use tracing::trace;

/// A call to a program function, with the scope it appears in
#[derive(Debug, Clone)]
struct CallSite {
    callee: String,
    args: Vec<String>,
    /// Enclosing function, `None` at program level
    scope: Option<String>,
}

/// Lookup chain: locals, then program variables, then external variables
struct Env<'a> {
    locals: Option<&'a SymbolTable>,
    globals: &'a SymbolTable,
    external: Option<&'a SymbolTable>,
    returns: &'a HashMap<String, Option<ScalarType>>,
}

impl TypeEnv for Env<'_> {
    fn variable_type(&self, name: &str) -> Option<ScalarType> {
        self.locals
            .and_then(|locals| locals.type_of(name))
            .or_else(|| self.globals.type_of(name))
            .or_else(|| self.external.and_then(|ext| ext.type_of(name)))
    }

    fn return_type(&self, function: &str) -> Option<ScalarType> {
        self.returns.get(function).copied().flatten()
    }
}

/// Run type inference over a parsed program, in place
pub fn infer_types(ast: &mut Ast, external: Option<&SymbolTable>) {
    let mut inference = TypeInference::new(ast, external);
    inference.run(ast);
}

struct TypeInference<'a> {
    external: Option<&'a SymbolTable>,
    /// Known return types by function name; `None` for procedures
    returns: HashMap<String, Option<ScalarType>>,
    /// Local scopes by function name, as seeded or as analyzed
    scopes: HashMap<String, SymbolTable>,
    call_sites: Vec<CallSite>,
}

impl<'a> TypeInference<'a> {
    fn new(ast: &Ast, external: Option<&'a SymbolTable>) -> Self {
        let mut returns = HashMap::new();
        let mut scopes = HashMap::new();

        for func in ast.functions() {
            returns.insert(func.name.name.clone(), func.declared_return);
            scopes.insert(func.name.name.clone(), seed_locals(func));
        }

        let mut collector = CallCollector {
            functions: returns.keys().cloned().collect(),
            scope: None,
            sites: Vec::new(),
        };
        walk_stmts(&mut collector, &ast.body);

        Self {
            external,
            returns,
            scopes,
            call_sites: collector.sites,
        }
    }

    fn run(&mut self, ast: &mut Ast) {
        let mut globals = std::mem::take(&mut ast.globals);
        self.program_pass(&ast.body, &mut globals, None);

        // give call sites inside functions a scope before any function is analyzed
        let provisional: Vec<_> = ast
            .functions()
            .map(|func| (func.name.name.clone(), self.provisional_scope(func, &globals)))
            .collect();
        self.scopes.extend(provisional);

        for stmt in ast.body.iter_mut() {
            if let StmtKind::Function(func) = &mut stmt.kind {
                self.analyze_function(func, &globals);
            }
        }

        let unresolved: HashSet<String> = globals
            .iter()
            .filter(|(_, var)| var.ty.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        if !unresolved.is_empty() {
            trace!(count = unresolved.len(), "retrying unresolved program variables");
            self.program_pass(&ast.body, &mut globals, Some(&unresolved));
        }

        ast.globals = globals;
    }

    /// Walk the top-level statements. With `only`, just those names are updated.
    fn program_pass(
        &self,
        body: &[Stmt],
        globals: &mut SymbolTable,
        only: Option<&HashSet<String>>,
    ) {
        let mut pass = ScopePass {
            inference: self,
            table: globals,
            globals: None,
            function: None,
            only,
            return_type: None,
            self_return: false,
        };
        walk_stmts(&mut pass, body);
    }

    /// A function's locals typed with its parameters still unresolved
    fn provisional_scope(&self, func: &Function, globals: &SymbolTable) -> SymbolTable {
        let mut locals = seed_locals(func);
        let mut pass = ScopePass {
            inference: self,
            table: &mut locals,
            globals: Some(globals),
            function: Some(func.name.name.as_str()),
            only: None,
            return_type: None,
            self_return: false,
        };
        walk_stmts(&mut pass, &func.body);
        locals
    }

    fn analyze_function(&mut self, func: &mut Function, globals: &SymbolTable) {
        let name = func.name.name.clone();
        let mut locals = seed_locals(func);

        for (index, param) in func.params.iter_mut().enumerate() {
            let ty = locals
                .type_of(&param.name.name)
                .or_else(|| self.argument_type(&name, index, globals))
                .unwrap_or(ScalarType::Int);
            param.ty = Some(ty);
            locals.infer(&param.name.name, Some(ty), param.span);
        }

        let (return_type, self_return) = {
            let mut pass = ScopePass {
                inference: self,
                table: &mut locals,
                globals: Some(globals),
                function: Some(name.as_str()),
                only: None,
                return_type: None,
                self_return: false,
            };
            walk_stmts(&mut pass, &func.body);
            (pass.return_type, pass.self_return)
        };

        func.return_type = match (func.declared_return, self_return) {
            (Some(_), _) => return_type,
            (None, true) => Some(return_type.unwrap_or(ScalarType::Int)),
            (None, false) => None,
        };

        trace!(
            function = %name,
            result = ?func.result_type(),
            locals = locals.len(),
            "analyzed function"
        );

        self.returns.insert(name.clone(), func.result_type());
        self.scopes.insert(name, locals.clone());
        func.locals = locals;
    }

    /// Type of the `index`th argument at the first call site of `function`
    /// where it resolves
    fn argument_type(
        &self,
        function: &str,
        index: usize,
        globals: &SymbolTable,
    ) -> Option<ScalarType> {
        self.call_sites
            .iter()
            .filter(|site| site.callee == function)
            .filter_map(|site| {
                let arg = site.args.get(index)?;
                let env = Env {
                    locals: site.scope.as_ref().and_then(|s| self.scopes.get(s)),
                    globals,
                    external: self.external,
                    returns: &self.returns,
                };
                infer_type(arg, &env)
            })
            .next()
    }
}

/// Declared locals plus the annotated parameter types
fn seed_locals(func: &Function) -> SymbolTable {
    let mut locals = func.locals.clone();
    for param in &func.params {
        if let Some(ty) = param.ty {
            if !locals.get(&param.name.name).is_some_and(Variable::is_declared) {
                locals.define(param.name.name.clone(), Variable::declared(ty, param.span));
            }
        }
    }
    locals
}

/// Collects calls to program functions: call statements, and calls inside
/// any expression
struct CallCollector {
    functions: HashSet<String>,
    scope: Option<String>,
    sites: Vec<CallSite>,
}

impl CallCollector {
    fn push(&mut self, callee: &str, args: Vec<String>) {
        if self.functions.contains(callee) {
            self.sites.push(CallSite {
                callee: callee.to_string(),
                args,
                scope: self.scope.clone(),
            });
        }
    }
}

impl Visitor for CallCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if let StmtKind::Call { name, args } = &stmt.kind {
            let args = args.iter().map(|a| a.text.clone()).collect();
            self.push(&name.name, args);
        }
        walk_stmt(self, stmt);
    }

    fn visit_function(&mut self, func: &Function) {
        let outer = self.scope.replace(func.name.name.clone());
        walk_stmts(self, &func.body);
        self.scope = outer;
    }

    fn visit_expr(&mut self, expr: &Expr) {
        for call in find_calls(&expr.text) {
            self.push(&call.name, call.args);
        }
    }
}

/// Assigns types within one scope. Branches and loops share the scope.
struct ScopePass<'p, 'a> {
    inference: &'p TypeInference<'a>,
    /// The scope being filled in
    table: &'p mut SymbolTable,
    /// Program variables, when `table` holds a function's locals
    globals: Option<&'p SymbolTable>,
    /// The function being analyzed, for self-returns
    function: Option<&'p str>,
    only: Option<&'p HashSet<String>>,
    return_type: Option<ScalarType>,
    self_return: bool,
}

impl ScopePass<'_, '_> {
    fn type_of(&self, expr: &Expr) -> Option<ScalarType> {
        let env = match self.globals {
            Some(globals) => Env {
                locals: Some(&*self.table),
                globals,
                external: self.inference.external,
                returns: &self.inference.returns,
            },
            None => Env {
                locals: None,
                globals: &*self.table,
                external: self.inference.external,
                returns: &self.inference.returns,
            },
        };
        infer_type(&expr.text, &env)
    }

    fn update(&mut self, name: &str, ty: Option<ScalarType>, span: SourceSpan) {
        if self.only.is_some_and(|only| !only.contains(name)) {
            return;
        }
        self.table.infer(name, ty, span);
    }
}

impl Visitor for ScopePass<'_, '_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let ty = self.type_of(value);
                if self.function == Some(target.name.as_str()) {
                    self.self_return = true;
                    if ty.is_some() {
                        self.return_type = ty;
                    }
                } else {
                    self.update(&target.name, ty, target.span);
                }
            }
            StmtKind::Input { target, conversion } => {
                let ty = match conversion {
                    Some(ty) => Some(*ty),
                    None if self.table.type_of(&target.name).is_none() => Some(ScalarType::Str),
                    None => None,
                };
                self.update(&target.name, ty, target.span);
            }
            StmtKind::For {
                iterator,
                start,
                end,
                step,
                ..
            } => {
                let is_float = [Some(start), Some(end), step.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|bound| self.type_of(bound) == Some(ScalarType::Float));
                let ty = if is_float {
                    ScalarType::Float
                } else {
                    ScalarType::Int
                };
                self.update(&iterator.name, Some(ty), iterator.span);
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_function(&mut self, _func: &Function) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn infer(source: &str) -> Ast {
        let mut ast = parse(source).unwrap();
        infer_types(&mut ast, None);
        ast
    }

    fn function<'a>(ast: &'a Ast, name: &str) -> &'a Function {
        ast.functions().find(|f| f.name.name == name).unwrap()
    }

    #[test]
    fn test_literal_typing() {
        let ast = infer("a = 5\nb = 5.0\nc = \"a\"\nd = True");
        assert_eq!(ast.globals.type_of("a"), Some(ScalarType::Int));
        assert_eq!(ast.globals.type_of("b"), Some(ScalarType::Float));
        assert_eq!(ast.globals.type_of("c"), Some(ScalarType::Str));
        assert_eq!(ast.globals.type_of("d"), Some(ScalarType::Bool));
    }

    #[test]
    fn test_arithmetic_typing() {
        let ast = infer("a = 1\nb = 2\nc = a / b\nd = a + b\ne = a + 1.5");
        assert_eq!(ast.globals.type_of("c"), Some(ScalarType::Float));
        assert_eq!(ast.globals.type_of("d"), Some(ScalarType::Int));
        assert_eq!(ast.globals.type_of("e"), Some(ScalarType::Float));
    }

    #[test]
    fn test_declarations_are_not_overwritten() {
        let ast = infer("ΠΡΑΓΜΑΤΙΚΕΣ: x\nx = 1");
        assert_eq!(ast.globals.type_of("x"), Some(ScalarType::Float));
        assert!(!ast.globals.get("x").unwrap().inferred);
    }

    #[test]
    fn test_input_targets() {
        let ast = infer("a = input()\nb = int(input())\nint: c\nc = input()");
        assert_eq!(ast.globals.type_of("a"), Some(ScalarType::Str));
        assert_eq!(ast.globals.type_of("b"), Some(ScalarType::Int));
        assert_eq!(ast.globals.type_of("c"), Some(ScalarType::Int));
    }

    #[test]
    fn test_loop_iterators() {
        let ast = infer("for i in range(10):\n    pass\nfor t in range(0, 1.5):\n    pass");
        assert_eq!(ast.globals.type_of("i"), Some(ScalarType::Int));
        assert_eq!(ast.globals.type_of("t"), Some(ScalarType::Float));
    }

    #[test]
    fn test_nested_branches_share_program_scope() {
        let ast = infer("if x > 0:\n    y = 1\nelse:\n    z = y * 2.0");
        assert_eq!(ast.globals.type_of("y"), Some(ScalarType::Int));
        assert_eq!(ast.globals.type_of("z"), Some(ScalarType::Float));
    }

    #[test]
    fn test_function_with_return_type() {
        let ast = infer("def f():\n    return 5\n\nx = f()");
        let f = function(&ast, "f");
        assert_eq!(f.result_type(), Some(ScalarType::Int));
        // resolved by the retry after the function pass
        assert_eq!(ast.globals.type_of("x"), Some(ScalarType::Int));
    }

    #[test]
    fn test_self_assignment_sets_return_type() {
        let ast = infer("def f(a):\n    f = a * 1.5");
        assert_eq!(function(&ast, "f").return_type, Some(ScalarType::Float));
    }

    #[test]
    fn test_procedure_has_no_return_type() {
        let ast = infer("def show(a):\n    print(a)\n\nshow(1)");
        assert_eq!(function(&ast, "show").result_type(), None);
    }

    #[test]
    fn test_unresolvable_self_return_defaults_to_int() {
        let ast = infer("def f(a):\n    return g(a)");
        assert_eq!(function(&ast, "f").return_type, Some(ScalarType::Int));
    }

    #[test]
    fn test_parameters_from_call_sites() {
        let source = "\
def area(w, h, label):
    s = w * h
    return s

x = 2.5
area(x, 3, \"room\")
";
        let ast = infer(source);
        let f = function(&ast, "area");
        let types: Vec<_> = f.params.iter().map(|p| p.ty).collect();
        assert_eq!(
            types,
            vec![Some(ScalarType::Float), Some(ScalarType::Int), Some(ScalarType::Str)]
        );
        assert_eq!(f.locals.type_of("s"), Some(ScalarType::Float));
        assert_eq!(f.return_type, Some(ScalarType::Float));
    }

    #[test]
    fn test_first_concrete_call_site_wins() {
        let ast = infer("def f(a):\n    print(a)\n\nf(unknown)\nf(\"text\")\nf(1)");
        assert_eq!(function(&ast, "f").params[0].ty, Some(ScalarType::Str));
    }

    #[test]
    fn test_call_expressions_count_as_call_sites() {
        let ast = infer("def half(n):\n    return n / 2\n\ny = half(3.0) + 1");
        let f = function(&ast, "half");
        assert_eq!(f.params[0].ty, Some(ScalarType::Float));
        assert_eq!(ast.globals.type_of("y"), Some(ScalarType::Float));
    }

    #[test]
    fn test_arguments_typed_in_calling_scope() {
        let source = "\
def inner(v):
    print(v)

def outer():
    t = 1.5
    inner(t)
";
        let ast = infer(source);
        assert_eq!(function(&ast, "inner").params[0].ty, Some(ScalarType::Float));
    }

    #[test]
    fn test_unresolved_parameters_default_to_int() {
        let ast = infer("def f(a, b: str):\n    print(a, b)");
        let f = function(&ast, "f");
        assert_eq!(f.params[0].ty, Some(ScalarType::Int));
        assert_eq!(f.params[1].ty, Some(ScalarType::Str));
        assert_eq!(f.locals.type_of("a"), Some(ScalarType::Int));
    }

    #[test]
    fn test_function_locals_do_not_leak() {
        let ast = infer("def f():\n    tmp = 1\n\nx = 2");
        assert!(!ast.globals.contains("tmp"));
        assert_eq!(function(&ast, "f").locals.type_of("tmp"), Some(ScalarType::Int));
    }

    #[test]
    fn test_external_globals() {
        let mut external = SymbolTable::new();
        external.define("rate", Variable::declared(ScalarType::Float, SourceSpan::default()));
        let mut ast = parse("x = rate * 2").unwrap();
        infer_types(&mut ast, Some(&external));
        assert_eq!(ast.globals.type_of("x"), Some(ScalarType::Float));
        assert!(!ast.globals.contains("rate"));
    }

    #[test]
    fn test_declared_return_wins() {
        let ast = infer("def f() -> float:\n    return 1");
        let f = function(&ast, "f");
        assert_eq!(f.result_type(), Some(ScalarType::Float));
    }
}
