//! Statement emitter shared by both dialects
//!
//! One renderer walks the statement tree; the `Dialect` policy decides
//! whether declaration blocks are written and whether subprograms are split
//! into functions and procedures.

use super::dialect::{type_plural, type_singular, Dialect};
use super::expr::{keyword, quote_text, translate_expression, translate_pattern};
use crate::analysis::{has_self_return, SymbolTable};
use crate::parser::{Function, PrintArgs, Stmt, StmtKind, TemplatePart};

pub struct Emitter {
    dialect: &'static Dialect,
    /// Current indentation level
    indent: usize,
    /// Output buffer
    output: String,
}

impl Emitter {
    pub fn new(dialect: &'static Dialect) -> Self {
        Self {
            dialect,
            indent: 0,
            output: String::new(),
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// `ΜΕΤΑΒΛΗΤΕΣ` followed by one line per type, in order of first
    /// appearance. Unresolved variables are declared as integers.
    pub fn emit_declarations(&mut self, table: &SymbolTable) {
        let mut groups: Vec<(&'static str, Vec<&str>)> = Vec::new();
        for (name, var) in table.iter() {
            let heading = type_plural(var.ty);
            match groups.iter_mut().find(|(h, _)| *h == heading) {
                Some((_, names)) => names.push(name),
                None => groups.push((heading, vec![name])),
            }
        }

        self.writeln(&keyword("ΜΕΤΑΒΛΗΤΕΣ"));
        self.indent();
        for (heading, names) in groups {
            self.writeln(&format!("{}: {}", keyword(heading), names.join(", ")));
        }
        self.dedent();
    }

    /// Declarations (when the dialect has them), `ΑΡΧΗ` and the body one
    /// level deeper
    pub fn emit_frame(&mut self, symbols: Option<&SymbolTable>, body: &[Stmt]) {
        if self.dialect.declarations {
            if let Some(table) = symbols.filter(|t| !t.is_empty()) {
                self.emit_declarations(table);
            }
        }
        self.writeln(&keyword("ΑΡΧΗ"));
        self.indent();
        self.emit_stmts(body);
        self.dedent();
    }

    pub fn emit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.emit_stmt(stmt);
        }
    }

    fn emit_body(&mut self, stmts: &[Stmt]) {
        self.indent();
        self.emit_stmts(stmts);
        self.dedent();
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                self.writeln(&format!("{} &lt;- {}", target, translate_expression(&value.text)));
            }
            StmtKind::Input { target, .. } => {
                self.writeln(&format!("{} {}", keyword("ΔΙΑΒΑΣΕ"), target));
            }
            StmtKind::Print(args) => {
                let args = print_arguments(args);
                if args.is_empty() {
                    self.writeln(&keyword("ΓΡΑΨΕ"));
                } else {
                    self.writeln(&format!("{} {}", keyword("ΓΡΑΨΕ"), args));
                }
            }
            StmtKind::Call { name, args } => {
                let args: Vec<_> = args.iter().map(|a| translate_expression(&a.text)).collect();
                self.writeln(&format!("{} {}({})", keyword("ΚΑΛΕΣΕ"), name, args.join(", ")));
            }
            StmtKind::If {
                condition,
                body,
                elifs,
                else_body,
            } => {
                self.writeln(&format!(
                    "{} {} {}",
                    keyword("ΑΝ"),
                    translate_expression(&condition.text),
                    keyword("ΤΟΤΕ")
                ));
                self.emit_body(body);
                for elif in elifs {
                    self.writeln(&format!(
                        "{} {} {}",
                        keyword("ΑΛΛΙΩΣ_ΑΝ"),
                        translate_expression(&elif.condition.text),
                        keyword("ΤΟΤΕ")
                    ));
                    self.emit_body(&elif.body);
                }
                if let Some(else_body) = else_body {
                    self.writeln(&keyword("ΑΛΛΙΩΣ"));
                    self.emit_body(else_body);
                }
                self.writeln(&keyword("ΤΕΛΟΣ_ΑΝ"));
            }
            StmtKind::While { condition, body } => {
                self.writeln(&format!(
                    "{} {} {}",
                    keyword("ΟΣΟ"),
                    translate_expression(&condition.text),
                    keyword("ΕΠΑΝΑΛΑΒΕ")
                ));
                self.emit_body(body);
                self.writeln(&keyword("ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ"));
            }
            StmtKind::For {
                iterator,
                start,
                end,
                step,
                body,
            } => {
                let mut header = format!(
                    "{} {} {} {} {} {}",
                    keyword("ΓΙΑ"),
                    iterator,
                    keyword("ΑΠΟ"),
                    translate_expression(&start.text),
                    keyword("ΜΕΧΡΙ"),
                    translate_expression(&end.text)
                );
                if let Some(step) = step {
                    header.push_str(&format!(
                        " {} {}",
                        keyword("ΜΕ_ΒΗΜΑ"),
                        translate_expression(&step.text)
                    ));
                }
                self.writeln(&header);
                self.emit_body(body);
                self.writeln(&keyword("ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ"));
            }
            StmtKind::Match {
                subject,
                cases,
                default,
            } => {
                self.writeln(&format!(
                    "{} {}",
                    keyword("ΕΠΙΛΕΞΕ"),
                    translate_expression(&subject.text)
                ));
                self.indent();
                for case in cases {
                    self.writeln(&format!(
                        "{} {}",
                        keyword("ΠΕΡΙΠΤΩΣΗ"),
                        translate_pattern(&case.pattern.text)
                    ));
                    self.emit_body(&case.body);
                }
                if let Some(default) = default {
                    self.writeln(&keyword("ΠΕΡΙΠΤΩΣΗ ΑΛΛΙΩΣ"));
                    self.emit_body(default);
                }
                self.dedent();
                self.writeln(&keyword("ΤΕΛΟΣ_ΕΠΙΛΟΓΩΝ"));
            }
            StmtKind::Function(func) => {
                if self.dialect.subprogram_kinds {
                    self.emit_subprogram(func);
                } else {
                    self.emit_segment(func);
                }
            }
            StmtKind::Return(value) => {
                self.writeln(&format!("// return {}", translate_expression(&value.text)));
            }
        }
    }

    /// `ΣΥΝΑΡΤΗΣΗ` or `ΔΙΑΔΙΚΑΣΙΑ` with its own declarations
    fn emit_subprogram(&mut self, func: &Function) {
        let params = parameter_list(func);
        let is_function = is_function(func);

        if is_function {
            self.writeln(&format!(
                "{} {}({}): {}",
                keyword("ΣΥΝΑΡΤΗΣΗ"),
                func.name,
                params,
                keyword(type_singular(func.result_type()))
            ));
        } else {
            self.writeln(&format!("{} {}({})", keyword("ΔΙΑΔΙΚΑΣΙΑ"), func.name, params));
        }

        self.emit_frame(Some(&func.locals), &func.body);

        let end = if is_function {
            "ΤΕΛΟΣ_ΣΥΝΑΡΤΗΣΗΣ"
        } else {
            "ΤΕΛΟΣ_ΔΙΑΔΙΚΑΣΙΑΣ"
        };
        self.writeln(&keyword(end));
    }

    /// A subprogram as a plain `ΑΛΓΟΡΙΘΜΟΣ` segment
    fn emit_segment(&mut self, func: &Function) {
        self.writeln(&format!("{} {}", keyword("ΑΛΓΟΡΙΘΜΟΣ"), func.name));
        if !func.params.is_empty() {
            self.writeln(&format!("{} // {} //", keyword("ΔΕΔΟΜΕΝΑ"), parameter_list(func)));
        }
        self.emit_stmts(&func.body);
        self.writeln(&format!("{} {}", keyword("ΤΕΛΟΣ"), func.name));
    }
}

/// Whether a subprogram renders as a function rather than a procedure
pub fn is_function(func: &Function) -> bool {
    func.result_type().is_some() || has_self_return(&func.body, &func.name.name)
}

fn parameter_list(func: &Function) -> String {
    func.params
        .iter()
        .map(|p| p.name.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_arguments(args: &PrintArgs) -> String {
    match args {
        PrintArgs::Expr(expr) => translate_expression(&expr.text),
        PrintArgs::Template(parts) => parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Text(text) => {
                    let text = text.trim();
                    (!text.is_empty()).then(|| quote_text(text))
                }
                TemplatePart::Expr(expr) => Some(translate_expression(&expr.text)),
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_ast;
    use crate::codegen::dialect::{GLOSSA, PSEUDOGLOSSA};
    use crate::codegen::to_plain_text;
    use crate::parser::{parse, Ast};

    fn analyzed(source: &str) -> Ast {
        analyze_ast(parse(source).unwrap(), "ΔΟΚΙΜΗ", None).ast
    }

    fn render(dialect: &'static Dialect, source: &str) -> String {
        let ast = analyzed(source);
        let mut emitter = Emitter::new(dialect);
        emitter.emit_stmts(&ast.body);
        to_plain_text(&emitter.finish())
    }

    #[test]
    fn test_assignment_markup() {
        let ast = analyzed("x = 5");
        let mut emitter = Emitter::new(&GLOSSA);
        emitter.emit_stmts(&ast.body);
        assert_eq!(emitter.finish(), "x &lt;- <span class=\"int\">5</span>\n");
    }

    #[test]
    fn test_if_chain() {
        let source = "\
if x > 0:
    print(\"positive\")
elif x == 0:
    print(\"zero\")
else:
    y = -x
";
        let expected = "\
ΑΝ x > 0 ΤΟΤΕ
    ΓΡΑΨΕ \"positive\"
ΑΛΛΙΩΣ_ΑΝ x = 0 ΤΟΤΕ
    ΓΡΑΨΕ \"zero\"
ΑΛΛΙΩΣ
    y <- -x
ΤΕΛΟΣ_ΑΝ
";
        assert_eq!(render(&GLOSSA, source), expected);
    }

    #[test]
    fn test_loops() {
        let source = "\
for i in range(1, 10, 2):
    while i < 5:
        i += 1
for j in range(3):
    print()
";
        let expected = "\
ΓΙΑ i ΑΠΟ 1 ΜΕΧΡΙ 10 ΜΕ_ΒΗΜΑ 2
    ΟΣΟ i < 5 ΕΠΑΝΑΛΑΒΕ
        i <- i + 1
    ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ
ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ
ΓΙΑ j ΑΠΟ 0 ΜΕΧΡΙ 3
    ΓΡΑΨΕ
ΤΕΛΟΣ_ΕΠΑΝΑΛΗΨΗΣ
";
        assert_eq!(render(&GLOSSA, source), expected);
    }

    #[test]
    fn test_match() {
        let source = "\
match day:
    case 1 | 7:
        print(\"weekend\")
    case _:
        print(\"weekday\")
";
        let expected = "\
ΕΠΙΛΕΞΕ day
    ΠΕΡΙΠΤΩΣΗ 1, 7
        ΓΡΑΨΕ \"weekend\"
    ΠΕΡΙΠΤΩΣΗ ΑΛΛΙΩΣ
        ΓΡΑΨΕ \"weekday\"
ΤΕΛΟΣ_ΕΠΙΛΟΓΩΝ
";
        assert_eq!(render(&GLOSSA, source), expected);
    }

    #[test]
    fn test_io_and_calls() {
        let source = "\
n = int(input())
print(f\"n = {n}, double = {n * 2}\")
show(n, \"x\")
";
        let expected = "\
ΔΙΑΒΑΣΕ n
ΓΡΑΨΕ \"n =\", n, \", double =\", n * 2
ΚΑΛΕΣΕ show(n, \"x\")
";
        assert_eq!(render(&PSEUDOGLOSSA, source), expected);
    }

    #[test]
    fn test_declarations_group_by_type() {
        let ast = analyzed("a = 1\nb = 2.0\nc = a\nname = input()\nz = undefined_thing");
        let mut emitter = Emitter::new(&GLOSSA);
        emitter.emit_declarations(&ast.globals);
        let expected = "\
ΜΕΤΑΒΛΗΤΕΣ
    ΑΚΕΡΑΙΕΣ: a, c, z
    ΠΡΑΓΜΑΤΙΚΕΣ: b
    ΧΑΡΑΚΤΗΡΕΣ: name
";
        assert_eq!(to_plain_text(&emitter.finish()), expected);
    }

    #[test]
    fn test_function_and_procedure() {
        let source = "\
def square(x):
    return x * x

def greet(name):
    print(\"hi\", name)

greet(\"Ann\")
y = square(3)
";
        let expected = "\
ΣΥΝΑΡΤΗΣΗ square(x): ΑΚΕΡΑΙΑ
ΜΕΤΑΒΛΗΤΕΣ
    ΑΚΕΡΑΙΕΣ: x
ΑΡΧΗ
    square <- x * x
ΤΕΛΟΣ_ΣΥΝΑΡΤΗΣΗΣ
ΔΙΑΔΙΚΑΣΙΑ greet(name)
ΜΕΤΑΒΛΗΤΕΣ
    ΧΑΡΑΚΤΗΡΕΣ: name
ΑΡΧΗ
    ΓΡΑΨΕ \"hi\", name
ΤΕΛΟΣ_ΔΙΑΔΙΚΑΣΙΑΣ
ΚΑΛΕΣΕ greet(\"Ann\")
y <- square(3)
";
        assert_eq!(render(&GLOSSA, source), expected);
    }

    #[test]
    fn test_self_assignment_makes_a_function() {
        let ast = analyzed("def f(n):\n    if n > 0:\n        f = 1.5\n    else:\n        f = 0.5");
        let func = ast.functions().next().unwrap();
        assert!(is_function(func));

        let ast = analyzed("def g(n):\n    print(n)");
        assert!(!is_function(ast.functions().next().unwrap()));
    }

    #[test]
    fn test_loose_segment() {
        let source = "def area(w, h):\n    return w * h";
        let expected = "\
ΑΛΓΟΡΙΘΜΟΣ area
ΔΕΔΟΜΕΝΑ // w, h //
area <- w * h
ΤΕΛΟΣ area
";
        assert_eq!(render(&PSEUDOGLOSSA, source), expected);
    }

    #[test]
    fn test_frame_without_declarations() {
        let ast = analyzed("x = 1");
        let mut emitter = Emitter::new(&PSEUDOGLOSSA);
        emitter.emit_frame(Some(&ast.globals), &ast.body);
        assert_eq!(to_plain_text(&emitter.finish()), "ΑΡΧΗ\n    x <- 1\n");
    }
}
