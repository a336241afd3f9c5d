#[allow(clippy::wildcard_imports)]
use crate::ast::node::*;
use crate::ast::Visitor;
use std::rc::Rc;

/// A [`Visitor`] used to construct a GraphViz dot-file.
pub struct DotGenerator {
    counter: u64,
}

impl DotGenerator {
    /// Construct a GraphViz dot-file from a [`Program`].
    pub fn create_ast_dot(program: &Program) -> String {
        let mut dot_builder = Self { counter: 0 };

        let mut dot = "digraph astgraph {\n  \
            edge [arrowsize=.5];\n  \
            rankdir=\"TB\";\n  \
            newrank=true;\n  \
            nodesep=0.75;\n  \
            ranksep=0.75;\n"
            .to_string();

        dot.push_str(&dot_builder.visit_program(program));

        dot.push('}');

        dot
    }

    fn increment(&mut self) -> u64 {
        self.counter += 1;
        self.counter - 1
    }

    fn create_node(&mut self, label: &str, hidden: bool) -> (String, u64) {
        let label_str = {
            if hidden {
                "[shape=point]".to_owned()
            } else {
                format!(r#"[label="{}"]"#, escape(label))
            }
        };

        (
            format!("  node{} {}\n", self.counter, label_str),
            self.increment(),
        )
    }

    fn new_node(&mut self, label: &str) -> (String, u64) {
        self.create_node(label, false)
    }

    fn hidden_node(&mut self) -> (String, u64) {
        self.create_node("", true)
    }

    fn node_connector(
        node1: u64,
        node2: u64,
        label: Option<&str>,
        directed: bool,
    ) -> String {
        let mut string = format!("  node{} -> node{}", node2, node1);

        let mut args: Vec<String> = Vec::new();

        if let Some(label) = label {
            args.push(format!(r#"label="{}""#, escape(label)));
        }

        if !directed {
            args.push("dir=none".to_owned());
        }

        if !args.is_empty() {
            string.push_str(&format!(" [{}]", args.join(", ")));
        }

        string.push('\n');

        string
    }

    fn connect_nodes(node1: u64, node2: u64) -> String {
        DotGenerator::node_connector(node1, node2, None, true)
    }

    fn connect_nodes_with_label(node1: u64, node2: u64, label: &str) -> String {
        DotGenerator::node_connector(node1, node2, Some(label), true)
    }

    /// Hangs `body` off `parent` through a hidden node labeled `label`.
    fn block(&mut self, parent: u64, label: &str, body: &[Statement]) -> String {
        let (mut string, hidden_node) = self.hidden_node();
        string += &DotGenerator::node_connector(
            hidden_node,
            parent,
            Some(label),
            false,
        );

        for statement in body {
            let statement_node = self.counter;
            string += &self.visit_statement(statement);
            string += &DotGenerator::connect_nodes(statement_node, hidden_node);
        }

        string
    }

    fn child(&mut self, parent: u64, label: &str, expression: &Expression) -> String {
        let node = self.counter;
        let mut string = self.visit_expression(expression);
        string += &DotGenerator::connect_nodes_with_label(node, parent, label);

        string
    }

    fn arguments(&mut self, parent: u64, arguments: &[Expression]) -> String {
        let mut string = String::new();

        for (i, argument) in arguments.iter().enumerate() {
            string += &self.child(parent, &format!("a{}", i + 1), argument);
        }

        string
    }

    fn elements(&mut self, label: &str, elements: &[Expression]) -> String {
        let (mut string, node) = self.new_node(label);

        for element in elements {
            let element_node = self.counter;
            string += &self.visit_expression(element);
            string += &DotGenerator::connect_nodes(element_node, node);
        }

        string
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

impl Visitor<String, String> for DotGenerator {
    fn visit_program(&mut self, program: &Program) -> String {
        let (mut string, program_node) = self.new_node("Program");
        string += &self.block(program_node, "body", program.body());

        string
    }

    fn visit_function_def(&mut self, function: &Rc<FunctionDef>) -> String {
        let (mut string, function_node) = self.new_node(&format!(
            "Def:\n{}({})",
            function.name(),
            function.parameters().join(", ")
        ));

        string += &self.block(function_node, "body", function.body());

        string
    }

    fn visit_class_def(&mut self, name: &str, body: &[Statement]) -> String {
        let (mut string, class_node) =
            self.new_node(&format!("Class:\n{}", name));

        string += &self.block(class_node, "body", body);

        string
    }

    fn visit_import(&mut self, names: &[ImportName]) -> String {
        let names: Vec<String> = names
            .iter()
            .map(|import| match &import.alias {
                Some(alias) => format!("{} as {}", import.module, alias),
                None => import.module.clone(),
            })
            .collect();

        let (string, _) =
            self.new_node(&format!("Import:\n{}", names.join("\n")));

        string
    }

    fn visit_while(&mut self, condition: &Expression, body: &[Statement]) -> String {
        let (mut string, while_node) = self.new_node("While");

        string += &self.child(while_node, "cond", condition);
        string += &self.block(while_node, "body", body);

        string
    }

    fn visit_for(
        &mut self,
        target: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> String {
        let (mut string, for_node) = self.new_node(&format!("For:\n{}", target));

        string += &self.child(for_node, "in", iterable);
        string += &self.block(for_node, "body", body);

        string
    }

    fn visit_if(
        &mut self,
        condition: &Expression,
        body: &[Statement],
        elif_blocks: &[ElifBlock],
        else_body: Option<&[Statement]>,
    ) -> String {
        let (mut string, if_node) = self.new_node("If");

        string += &self.child(if_node, "cond", condition);
        string += &self.block(if_node, "then", body);

        for block in elif_blocks {
            let (elif_string, elif_node) = self.new_node("Elif");
            string += &elif_string;
            string += &DotGenerator::connect_nodes(elif_node, if_node);
            string += &self.child(elif_node, "cond", &block.condition);
            string += &self.block(elif_node, "then", &block.body);
        }

        if let Some(else_body) = else_body {
            string += &self.block(if_node, "else", else_body);
        }

        string
    }

    fn visit_try(
        &mut self,
        body: &[Statement],
        handlers: &[ExceptHandler],
        else_body: Option<&[Statement]>,
        finally_body: Option<&[Statement]>,
    ) -> String {
        let (mut string, try_node) = self.new_node("Try");

        string += &self.block(try_node, "body", body);

        for handler in handlers {
            let mut label = "Except".to_string();

            if let Some(exception) = &handler.exception {
                label += &format!(":\n{}", exception);
            }

            if let Some(alias) = &handler.alias {
                label += &format!(" as {}", alias);
            }

            let (handler_string, handler_node) = self.new_node(&label);
            string += &handler_string;
            string += &DotGenerator::connect_nodes(handler_node, try_node);
            string += &self.block(handler_node, "body", &handler.body);
        }

        if let Some(else_body) = else_body {
            string += &self.block(try_node, "else", else_body);
        }

        if let Some(finally_body) = finally_body {
            string += &self.block(try_node, "finally", finally_body);
        }

        string
    }

    fn visit_pass(&mut self) -> String {
        self.new_node("Pass").0
    }

    fn visit_break(&mut self) -> String {
        self.new_node("Break").0
    }

    fn visit_return(&mut self, value: Option<&Expression>) -> String {
        let (mut string, return_node) = self.new_node("Return");

        if let Some(value) = value {
            let value_node = self.counter;
            string += &self.visit_expression(value);
            string += &DotGenerator::connect_nodes(value_node, return_node);
        }

        string
    }

    fn visit_assignment(&mut self, target: &str, value: &Expression) -> String {
        let (mut string, assignment_node) =
            self.new_node(&format!("Assign:\n{} =", target));

        let value_node = self.counter;
        string += &self.visit_expression(value);
        string += &DotGenerator::connect_nodes(value_node, assignment_node);

        string
    }

    fn visit_augmented_assignment(
        &mut self,
        target: &str,
        operator: BinaryOperator,
        value: &Expression,
    ) -> String {
        let (mut string, assignment_node) =
            self.new_node(&format!("AugAssign:\n{} {}=", target, operator));

        let value_node = self.counter;
        string += &self.visit_expression(value);
        string += &DotGenerator::connect_nodes(value_node, assignment_node);

        string
    }

    fn visit_call_statement(
        &mut self,
        name: &str,
        arguments: &[Expression],
    ) -> String {
        self.visit_call(name, arguments)
    }

    fn visit_method_call(
        &mut self,
        object: &str,
        method: &str,
        arguments: &[Expression],
    ) -> String {
        let (mut string, call_node) =
            self.new_node(&format!("Method:\n{}.{}(...)", object, method));

        string += &self.arguments(call_node, arguments);

        string
    }

    fn visit_identifier(&mut self, name: &str) -> String {
        self.new_node(&format!("Id:\n{}", name)).0
    }

    fn visit_constant(&mut self, constant: &Constant) -> String {
        let label = match constant {
            Constant::None => "None".to_string(),
            Constant::Bool(true) => "True".to_string(),
            Constant::Bool(false) => "False".to_string(),
            Constant::Int(i) => i.to_string(),
            Constant::Float(f) => crate::value::format_float(*f),
        };

        self.new_node(&format!("Const:\n{}", label)).0
    }

    fn visit_string(&mut self, value: &str, formatted: bool) -> String {
        let prefix = if formatted { "FString" } else { "String" };

        self.new_node(&format!("{}:\n{}", prefix, value)).0
    }

    fn visit_list(&mut self, elements: &[Expression]) -> String {
        self.elements("List\n'[...]'", elements)
    }

    fn visit_dict(&mut self, pairs: &[(Expression, Expression)]) -> String {
        let (mut string, dict_node) = self.new_node("Dict\n'{...}'");

        for (key, value) in pairs {
            let key_node = self.counter;
            string += &self.visit_expression(key);
            string += &DotGenerator::connect_nodes(key_node, dict_node);
            string += &self.child(key_node, "value", value);
        }

        string
    }

    fn visit_tuple(&mut self, elements: &[Expression]) -> String {
        self.elements("Tuple\n'(...)'", elements)
    }

    fn visit_unaryop(
        &mut self,
        operator: UnaryOperator,
        operand: &Expression,
    ) -> String {
        let (mut string, unaryop_node) =
            self.new_node(&format!("UnOp:\n{}", operator));

        let operand_node = self.counter;
        string += &self.visit_expression(operand);
        string += &DotGenerator::connect_nodes(operand_node, unaryop_node);

        string
    }

    fn visit_binaryop(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> String {
        let (mut string, binaryop_node) =
            self.new_node(&format!("BinOp:\n{}", operator));

        let left_node = self.counter;
        string += &self.visit_expression(left);
        string += &DotGenerator::connect_nodes(left_node, binaryop_node);

        let right_node = self.counter;
        string += &self.visit_expression(right);
        string += &DotGenerator::connect_nodes(right_node, binaryop_node);

        string
    }

    fn visit_call(&mut self, name: &str, arguments: &[Expression]) -> String {
        let (mut string, call_node) =
            self.new_node(&format!("Call:\n{}(...)", name));

        string += &self.arguments(call_node, arguments);

        string
    }
}
