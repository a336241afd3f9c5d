#[allow(clippy::wildcard_imports)]
use crate::ast::node::*;
use crate::ast::Visitor;
use crate::error::SemanticDiagnostic;
use crate::function::is_builtin;
use crate::template::placeholders;
use log::{debug, trace};
use std::collections::HashSet;
use std::rc::Rc;

/// Walks the AST once and collects [`SemanticDiagnostic`]s.
#[derive(Debug)]
pub struct SemanticAnalyzer {
    scopes: Vec<HashSet<String>>,
    functions: HashSet<String>,
    classes: HashSet<String>,
    loop_depth: usize,
    current_function: Option<String>,
    diagnostics: Vec<SemanticDiagnostic>,
}

impl SemanticAnalyzer {
    fn new() -> Self {
        debug!("Creating SemanticAnalyzer");

        Self {
            scopes: vec![HashSet::new()],
            functions: HashSet::new(),
            classes: HashSet::new(),
            loop_depth: 0,
            current_function: None,
            diagnostics: Vec::new(),
        }
    }

    /// Public function for [`SemanticAnalyzer`]. An empty result means the
    /// program is accepted.
    pub fn analyze(program: &Program) -> Vec<SemanticDiagnostic> {
        let mut analyzer = Self::new();

        analyzer.visit_program(program);

        debug!("Analysis found {} diagnostic(s)", analyzer.diagnostics.len());
        analyzer.diagnostics
    }

    fn report(&mut self, diagnostic: SemanticDiagnostic) {
        trace!("Diagnostic: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        is_builtin(name)
            || self.functions.contains(name)
            || self.classes.contains(name)
            || self.scopes.iter().rev().any(|s| s.contains(name))
    }

    fn is_registered(&self, name: &str) -> bool {
        self.functions.contains(name) || self.classes.contains(name)
    }

    fn visit_body(&mut self, body: &[Statement]) {
        for statement in body {
            self.visit_statement(statement);
        }
    }

    fn visit_scoped(&mut self, body: &[Statement], declared: &[&str]) {
        self.scopes.push(HashSet::new());

        for name in declared {
            self.declare(name);
        }

        self.visit_body(body);
        self.scopes.pop();
    }

    fn visit_loop_body(&mut self, body: &[Statement], declared: &[&str]) {
        self.loop_depth += 1;
        self.visit_scoped(body, declared);
        self.loop_depth -= 1;
    }

    fn visit_all(&mut self, expressions: &[Expression]) {
        for expression in expressions {
            self.visit_expression(expression);
        }
    }
}

impl Visitor<(), ()> for SemanticAnalyzer {
    fn visit_program(&mut self, program: &Program) {
        self.visit_body(program.body());
    }

    fn visit_function_def(&mut self, function: &Rc<FunctionDef>) {
        let name = function.name();

        if self.is_registered(name) {
            self.report(SemanticDiagnostic::DuplicateDeclaration(
                name.to_string(),
            ));
            return;
        }

        trace!("Declaring function {}", name);
        self.functions.insert(name.to_string());

        let previous_function =
            self.current_function.replace(name.to_string());
        let previous_depth = std::mem::replace(&mut self.loop_depth, 0);

        let parameters: Vec<&str> =
            function.parameters().iter().map(String::as_str).collect();
        self.visit_scoped(function.body(), &parameters);

        self.loop_depth = previous_depth;
        self.current_function = previous_function;
    }

    fn visit_class_def(&mut self, name: &str, body: &[Statement]) {
        if self.is_registered(name) {
            self.report(SemanticDiagnostic::DuplicateDeclaration(
                name.to_string(),
            ));
            return;
        }

        trace!("Declaring class {}", name);
        self.classes.insert(name.to_string());

        self.visit_scoped(body, &[]);
    }

    fn visit_import(&mut self, names: &[ImportName]) {
        for import in names {
            self.declare(import.bound_name());
        }
    }

    fn visit_while(&mut self, condition: &Expression, body: &[Statement]) {
        self.visit_expression(condition);
        self.visit_loop_body(body, &[]);
    }

    fn visit_for(
        &mut self,
        target: &str,
        iterable: &Expression,
        body: &[Statement],
    ) {
        self.visit_expression(iterable);
        self.visit_loop_body(body, &[target]);
    }

    fn visit_if(
        &mut self,
        condition: &Expression,
        body: &[Statement],
        elif_blocks: &[ElifBlock],
        else_body: Option<&[Statement]>,
    ) {
        self.visit_expression(condition);
        self.visit_scoped(body, &[]);

        for block in elif_blocks {
            self.visit_expression(&block.condition);
            self.visit_scoped(&block.body, &[]);
        }

        if let Some(else_body) = else_body {
            self.visit_scoped(else_body, &[]);
        }
    }

    fn visit_try(
        &mut self,
        body: &[Statement],
        handlers: &[ExceptHandler],
        else_body: Option<&[Statement]>,
        finally_body: Option<&[Statement]>,
    ) {
        self.visit_body(body);

        for handler in handlers {
            let alias: Vec<&str> =
                handler.alias.iter().map(String::as_str).collect();
            self.visit_scoped(&handler.body, &alias);
        }

        for block in else_body.into_iter().chain(finally_body) {
            self.visit_body(block);
        }
    }

    fn visit_pass(&mut self) {}

    fn visit_break(&mut self) {
        if self.loop_depth == 0 {
            self.report(SemanticDiagnostic::BreakOutsideLoop);
        }
    }

    fn visit_return(&mut self, value: Option<&Expression>) {
        if self.current_function.is_none() {
            self.report(SemanticDiagnostic::ReturnOutsideFunction);
        }

        if let Some(value) = value {
            self.visit_expression(value);
        }
    }

    fn visit_assignment(&mut self, target: &str, value: &Expression) {
        self.visit_expression(value);
        self.declare(target);
    }

    fn visit_augmented_assignment(
        &mut self,
        target: &str,
        _operator: BinaryOperator,
        value: &Expression,
    ) {
        if !self.is_declared(target) {
            self.report(SemanticDiagnostic::AssignmentBeforeDeclaration(
                target.to_string(),
            ));
        }

        self.visit_expression(value);
    }

    fn visit_call_statement(&mut self, name: &str, arguments: &[Expression]) {
        self.visit_call(name, arguments);
    }

    fn visit_method_call(
        &mut self,
        object: &str,
        _method: &str,
        arguments: &[Expression],
    ) {
        if !self.is_declared(object) {
            self.report(SemanticDiagnostic::UndeclaredObject(
                object.to_string(),
            ));
        }

        self.visit_all(arguments);
    }

    fn visit_identifier(&mut self, name: &str) {
        if !self.is_declared(name) {
            self.report(SemanticDiagnostic::UndeclaredIdentifier(
                name.to_string(),
            ));
        }
    }

    fn visit_constant(&mut self, _constant: &Constant) {}

    fn visit_string(&mut self, value: &str, formatted: bool) {
        if formatted {
            for name in placeholders(value) {
                self.visit_identifier(name);
            }
        }
    }

    fn visit_list(&mut self, elements: &[Expression]) {
        self.visit_all(elements);
    }

    fn visit_dict(&mut self, pairs: &[(Expression, Expression)]) {
        for (key, value) in pairs {
            self.visit_expression(key);
            self.visit_expression(value);
        }
    }

    fn visit_tuple(&mut self, elements: &[Expression]) {
        self.visit_all(elements);
    }

    fn visit_unaryop(
        &mut self,
        _operator: UnaryOperator,
        operand: &Expression,
    ) {
        self.visit_expression(operand);
    }

    fn visit_binaryop(
        &mut self,
        left: &Expression,
        _operator: BinaryOperator,
        right: &Expression,
    ) {
        self.visit_expression(left);
        self.visit_expression(right);
    }

    fn visit_call(&mut self, name: &str, arguments: &[Expression]) {
        if !self.functions.contains(name) && !is_builtin(name) {
            self.report(SemanticDiagnostic::UndefinedFunction(
                name.to_string(),
            ));
        }

        self.visit_all(arguments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Parser, ParserOptions};
    use crate::lexer::tokenize;
    use anyhow::Result;

    fn analyze(source: &str) -> Result<Vec<SemanticDiagnostic>> {
        let tokens = tokenize(source)?.into_tokens();
        let program = Parser::new(tokens, ParserOptions::default()).parse()?;

        Ok(SemanticAnalyzer::analyze(&program))
    }

    #[test]
    fn analysis_accepts_valid_program_test() -> Result<()> {
        let source = "import os.path as p\nx = 1\ndef f(a):\n    return a + x\nif x:\n    y = f(x)\n    print(f'{x}', len([y]))";

        assert_eq!(analyze(source)?, []);
        Ok(())
    }

    #[test]
    fn analysis_duplicate_declaration_test() -> Result<()> {
        let diagnostics =
            analyze("def f():\n    pass\ndef f():\n    print(undeclared)")?;

        assert_eq!(
            diagnostics,
            [SemanticDiagnostic::DuplicateDeclaration("f".to_string())]
        );
        assert_eq!(
            diagnostics[0].to_string(),
            "Duplicate function or class declaration: 'f'."
        );
        Ok(())
    }

    #[test]
    fn analysis_class_function_name_collision_test() -> Result<()> {
        let diagnostics = analyze("class A:\n    pass\ndef A():\n    pass")?;

        assert_eq!(
            diagnostics,
            [SemanticDiagnostic::DuplicateDeclaration("A".to_string())]
        );
        Ok(())
    }

    #[test]
    fn analysis_undeclared_identifier_test() -> Result<()> {
        assert_eq!(
            analyze("print(x)")?,
            [SemanticDiagnostic::UndeclaredIdentifier("x".to_string())]
        );
        assert_eq!(analyze("x = 1\nprint(x)")?, []);
        Ok(())
    }

    #[test]
    fn analysis_format_placeholders_test() -> Result<()> {
        assert_eq!(
            analyze("print(f'{missing}')")?,
            [SemanticDiagnostic::UndeclaredIdentifier("missing".to_string())]
        );
        assert_eq!(analyze("print('{missing}')")?, []);
        Ok(())
    }

    #[test]
    fn analysis_undefined_function_test() -> Result<()> {
        assert_eq!(
            analyze("open('file')")?,
            [SemanticDiagnostic::UndefinedFunction("open".to_string())]
        );
        Ok(())
    }

    #[test]
    fn analysis_recursion_is_valid_test() -> Result<()> {
        let source = "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)";

        assert_eq!(analyze(source)?, []);
        Ok(())
    }

    #[test]
    fn analysis_method_call_object_test() -> Result<()> {
        assert_eq!(
            analyze("items.append(1)")?,
            [SemanticDiagnostic::UndeclaredObject("items".to_string())]
        );
        assert_eq!(analyze("items = []\nitems.append(1)")?, []);
        Ok(())
    }

    #[test]
    fn analysis_augmented_assignment_test() -> Result<()> {
        assert_eq!(
            analyze("total += 1")?,
            [SemanticDiagnostic::AssignmentBeforeDeclaration(
                "total".to_string()
            )]
        );
        Ok(())
    }

    #[test]
    fn analysis_return_and_break_placement_test() -> Result<()> {
        assert_eq!(
            analyze("return 1\nbreak")?,
            [
                SemanticDiagnostic::ReturnOutsideFunction,
                SemanticDiagnostic::BreakOutsideLoop
            ]
        );
        assert_eq!(analyze("while True:\n    break")?, []);
        Ok(())
    }

    #[test]
    fn analysis_function_resets_loop_depth_test() -> Result<()> {
        let diagnostics = analyze("while True:\n    def f():\n        break")?;

        assert_eq!(diagnostics, [SemanticDiagnostic::BreakOutsideLoop]);
        Ok(())
    }

    #[test]
    fn analysis_scopes_test() -> Result<()> {
        // Names bound inside a branch are gone after it.
        assert_eq!(
            analyze("if True:\n    y = 1\nif y:\n    pass")?,
            [SemanticDiagnostic::UndeclaredIdentifier("y".to_string())]
        );

        // The loop target only exists in the loop body.
        assert_eq!(analyze("for i in [1]:\n    print(i)")?, []);

        // Handler aliases are only visible in their handler.
        let source = "try:\n    pass\nexcept ValueError as e:\n    print(e)\nfinally:\n    print(e)";
        assert_eq!(
            analyze(source)?,
            [SemanticDiagnostic::UndeclaredIdentifier("e".to_string())]
        );
        Ok(())
    }

    #[test]
    fn analysis_collects_all_diagnostics_test() -> Result<()> {
        let diagnostics = analyze("print(a)\nprint(b)\nc += 1\nbreak")?;

        assert_eq!(diagnostics.len(), 4);
        Ok(())
    }
}
