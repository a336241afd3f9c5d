use crate::ast::node::{
    BinaryOperator, Constant, ElifBlock, ExceptHandler, Expression,
    FunctionDef, ImportName, Program, Statement, UnaryOperator,
};
use crate::error::{ErrorContext, ParserError};
use crate::token::{Token, TokenKind, CONSTRUCT_KEYWORDS};
use log::{debug, trace};
use lookahead::{Lookahead, WithLookahead};
use std::rc::Rc;

type Result<T> = std::result::Result<T, ParserError>;

const MAX_PARSING_DEPTH: u64 = 64;

/// How the parser decides where a block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// A block ends at end of input, at a keyword in its stop set, or at a
    /// construct keyword once it holds at least one statement.
    #[default]
    Heuristic,
    /// A block ends at the first statement that starts at or left of the
    /// column of its header keyword.
    Indentation,
}

/// Options for the [`Parser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// See [`BlockMode`].
    pub block_mode: BlockMode,
}

/// Reads a sequence of [Token]s and builds an Abstract Syntax Tree.
pub struct Parser {
    tokens: Lookahead<std::vec::IntoIter<Token>>,
    end: Token,
    options: ParserOptions,
    depth: u64,
    statement: usize,
}

impl Parser {
    /// Create a [Parser] from tokens. A missing end-of-input token is
    /// appended.
    pub fn new(mut tokens: Vec<Token>, options: ParserOptions) -> Self {
        let end = match tokens.last() {
            Some(token) if token.kind() == TokenKind::EndOfInput => {
                token.clone()
            }
            Some(token) => Token::end_of_input(
                token.line_no(),
                token.col_no() + token.lexeme().chars().count(),
            ),
            None => Token::end_of_input(1, 1),
        };

        if tokens.last().map(Token::kind) != Some(TokenKind::EndOfInput) {
            tokens.push(end.clone());
        }

        Parser {
            tokens: tokens.into_iter().lookahead(),
            end,
            options,
            depth: 0,
            statement: 0,
        }
    }

    /// Run [Parser] to create an Abstract Syntax Tree.
    pub fn parse(&mut self) -> Result<Program> {
        let program = self.program()?;

        debug!("Parsed {} token(s)", self.tokens.consumed());
        Ok(program)
    }

    fn current(&mut self) -> &Token {
        match self.tokens.peek() {
            Some(token) => token,
            None => &self.end,
        }
    }

    fn peek_nth(&mut self, n: usize) -> &Token {
        self.tokens.peek_nth(n).unwrap_or(&self.end)
    }

    fn current_context(&mut self) -> ErrorContext {
        let statement = self.statement;
        ErrorContext::from_token(self.current(), statement)
    }

    /// End of input is never consumed; advancing past it returns it again.
    fn advance(&mut self) -> Token {
        self.tokens
            .next_if(|token| token.kind() != TokenKind::EndOfInput)
            .unwrap_or_else(|| self.end.clone())
    }

    fn check(&mut self, kind: TokenKind, lexeme: &str) -> bool {
        self.current().is(kind, lexeme)
    }

    fn check_keyword(&mut self, keyword: &str) -> bool {
        self.current().is_keyword(keyword)
    }

    fn check_punctuation(&mut self, punctuation: &str) -> bool {
        self.current().is_punctuation(punctuation)
    }

    fn consume(&mut self, kind: TokenKind, lexeme: &str) -> Result<Token> {
        if self.check(kind, lexeme) {
            Ok(self.advance())
        } else {
            Err(ParserError::UnexpectedToken {
                context: self.current_context(),
                expected: format!(r#"{} "{}""#, kind, lexeme),
            })
        }
    }

    fn consume_keyword(&mut self, keyword: &str) -> Result<Token> {
        self.consume(TokenKind::Keyword, keyword)
    }

    fn consume_punctuation(&mut self, punctuation: &str) -> Result<Token> {
        self.consume(TokenKind::Punctuation, punctuation)
    }

    fn consume_id(&mut self) -> Result<String> {
        if self.current().kind() == TokenKind::Identifier {
            Ok(self.advance().lexeme().to_string())
        } else {
            Err(ParserError::UnexpectedToken {
                context: self.current_context(),
                expected: TokenKind::Identifier.to_string(),
            })
        }
    }

    fn inc_depth(&mut self) -> Result<()> {
        self.depth += 1;

        if self.depth > MAX_PARSING_DEPTH {
            return Err(ParserError::MaxDepth {
                context: self.current_context(),
                depth: MAX_PARSING_DEPTH,
            });
        }

        Ok(())
    }

    fn dec_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Depth Prefix
    fn dp(&self) -> String {
        (0..self.depth).map(|i| (i % 10).to_string()).collect()
    }

    /// Clause keywords (`elif`, `else`, `except`, `finally`) only continue a
    /// statement if, in indentation mode, they line up with its header.
    fn continues(&mut self, keyword: &str, header_col: usize) -> bool {
        let mode = self.options.block_mode;
        let token = self.current();

        token.is_keyword(keyword)
            && (mode == BlockMode::Heuristic || token.col_no() == header_col)
    }

    // Grammar functions
    fn program(&mut self) -> Result<Program> {
        // Statement*
        trace!("Program");
        let mut body = Vec::new();

        while self.current().kind() != TokenKind::EndOfInput {
            body.push(self.statement()?);
        }

        Ok(Program::new(body))
    }

    fn block(
        &mut self,
        stop: &[&str],
        header_col: usize,
    ) -> Result<Vec<Statement>> {
        // Statement*
        self.inc_depth()?;
        trace!("{} Block", self.dp());

        let mode = self.options.block_mode;
        let mut statements = Vec::new();

        loop {
            let token = self.current();

            let ends = match token.kind() {
                TokenKind::EndOfInput => true,
                TokenKind::Keyword if stop.contains(&token.lexeme()) => true,
                _ => match mode {
                    BlockMode::Heuristic => {
                        token.kind() == TokenKind::Keyword
                            && CONSTRUCT_KEYWORDS.contains(&token.lexeme())
                            && !statements.is_empty()
                    }
                    BlockMode::Indentation => token.col_no() <= header_col,
                },
            };

            if ends {
                break;
            }

            statements.push(self.statement()?);
        }

        self.dec_depth();
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement> {
        self.inc_depth()?;
        self.statement += 1;

        let token = self.current().clone();
        trace!("{} Statement {}: {}", self.dp(), self.statement, token);

        let statement = match token.kind() {
            TokenKind::Keyword => match token.lexeme() {
                "def" => self.function_def(),
                "class" => self.class_def(),
                "import" => self.import(),
                "if" => self.if_statement(),
                "while" => self.while_statement(),
                "for" => self.for_statement(),
                "try" => self.try_statement(),
                "pass" => {
                    self.advance();
                    Ok(Statement::Pass)
                }
                "break" => {
                    self.advance();
                    Ok(Statement::Break)
                }
                "return" => self.return_statement(),
                _ => Err(ParserError::UnrecognizedStatement(
                    self.current_context(),
                )),
            },
            TokenKind::Identifier => self.identifier_statement(),
            _ => {
                Err(ParserError::UnrecognizedStatement(self.current_context()))
            }
        }?;

        self.dec_depth();
        Ok(statement)
    }

    fn function_def(&mut self) -> Result<Statement> {
        // "def" ID "(" ( ID ( "," ID )* )? ")" ":" Block
        let header = self.consume_keyword("def")?;
        let name = self.consume_id()?;
        trace!(r#"{} FunctionDef: "{}""#, self.dp(), name);

        self.consume_punctuation("(")?;

        let mut parameters = Vec::new();

        while !self.check_punctuation(")") {
            parameters.push(self.consume_id()?);

            if self.check_punctuation(",") {
                self.advance();
            } else {
                break;
            }
        }

        self.consume_punctuation(")")?;
        self.consume_punctuation(":")?;

        let body = self.block(&[], header.col_no())?;

        Ok(Statement::FunctionDef(Rc::new(FunctionDef {
            name,
            parameters,
            body,
        })))
    }

    fn class_def(&mut self) -> Result<Statement> {
        // "class" ID ( "(" ( ID ( "," ID )* )? ")" )? ":" Block
        let header = self.consume_keyword("class")?;
        let name = self.consume_id()?;
        trace!(r#"{} ClassDef: "{}""#, self.dp(), name);

        if self.check_punctuation("(") {
            self.advance();

            while !self.check_punctuation(")") {
                self.consume_id()?;

                if self.check_punctuation(",") {
                    self.advance();
                } else {
                    break;
                }
            }

            self.consume_punctuation(")")?;
        }

        self.consume_punctuation(":")?;

        let body = self.block(&[], header.col_no())?;

        Ok(Statement::ClassDef { name, body })
    }

    fn import(&mut self) -> Result<Statement> {
        // "import" Dotted ( ID("as") ID )? ( "," Dotted ( ID("as") ID )? )*
        self.consume_keyword("import")?;

        let mut names = Vec::new();

        loop {
            let mut module = self.consume_id()?;

            while self.check_punctuation(".") {
                self.advance();
                module.push('.');
                module.push_str(&self.consume_id()?);
            }

            let alias = if self.check(TokenKind::Identifier, "as") {
                self.advance();
                Some(self.consume_id()?)
            } else {
                None
            };

            trace!(r#"{} Import: "{}""#, self.dp(), module);
            names.push(ImportName { module, alias });

            if self.check_punctuation(",") {
                self.advance();
            } else {
                break;
            }
        }

        Ok(Statement::Import { names })
    }

    fn if_statement(&mut self) -> Result<Statement> {
        // "if" Expression ":" Block ( "elif" Expression ":" Block )*
        // ( "else" ":" Block )?
        let header = self.consume_keyword("if")?;
        let condition = self.expression()?;
        self.consume_punctuation(":")?;
        let body = self.block(&["elif", "else"], header.col_no())?;

        let mut elif_blocks = Vec::new();

        while self.continues("elif", header.col_no()) {
            let clause = self.advance();
            let condition = self.expression()?;
            self.consume_punctuation(":")?;
            let body = self.block(&["elif", "else"], clause.col_no())?;

            elif_blocks.push(ElifBlock { condition, body });
        }

        let else_body = if self.continues("else", header.col_no()) {
            let clause = self.advance();
            self.consume_punctuation(":")?;
            Some(self.block(&[], clause.col_no())?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            body,
            elif_blocks,
            else_body,
        })
    }

    fn while_statement(&mut self) -> Result<Statement> {
        // "while" Expression ":" Block
        let header = self.consume_keyword("while")?;
        let condition = self.expression()?;
        self.consume_punctuation(":")?;
        let body = self.block(&[], header.col_no())?;

        Ok(Statement::While { condition, body })
    }

    fn for_statement(&mut self) -> Result<Statement> {
        // "for" ID "in" Expression ":" Block
        let header = self.consume_keyword("for")?;
        let target = self.consume_id()?;
        self.consume_keyword("in")?;
        let iterable = self.expression()?;
        self.consume_punctuation(":")?;
        let body = self.block(&[], header.col_no())?;

        Ok(Statement::For {
            target,
            iterable,
            body,
        })
    }

    fn try_statement(&mut self) -> Result<Statement> {
        // "try" ":" Block ( "except" ( ID ( ID("as") ID )? )? ":" Block )*
        // ( "else" ":" Block )? ( "finally" ":" Block )?
        const STOP: [&str; 3] = ["except", "else", "finally"];

        let header = self.consume_keyword("try")?;
        self.consume_punctuation(":")?;
        let body = self.block(&STOP, header.col_no())?;

        let mut handlers = Vec::new();

        while self.continues("except", header.col_no()) {
            let clause = self.advance();

            let (exception, alias) =
                if self.current().kind() == TokenKind::Identifier {
                    let exception = self.consume_id()?;

                    let alias = if self.check(TokenKind::Identifier, "as") {
                        self.advance();
                        Some(self.consume_id()?)
                    } else {
                        None
                    };

                    (Some(exception), alias)
                } else {
                    (None, None)
                };

            self.consume_punctuation(":")?;
            let body = self.block(&STOP, clause.col_no())?;

            handlers.push(ExceptHandler {
                exception,
                alias,
                body,
            });
        }

        let else_body = if self.continues("else", header.col_no()) {
            let clause = self.advance();
            self.consume_punctuation(":")?;
            Some(self.block(&["finally"], clause.col_no())?)
        } else {
            None
        };

        let finally_body = if self.continues("finally", header.col_no()) {
            let clause = self.advance();
            self.consume_punctuation(":")?;
            Some(self.block(&[], clause.col_no())?)
        } else {
            None
        };

        Ok(Statement::Try {
            body,
            handlers,
            else_body,
            finally_body,
        })
    }

    fn return_statement(&mut self) -> Result<Statement> {
        // "return" Expression?
        self.consume_keyword("return")?;

        let value = if self.starts_term() {
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Statement::Return { value })
    }

    fn identifier_statement(&mut self) -> Result<Statement> {
        // ID "." ID Arguments
        // | ID "=" Expression
        // | ID AugmentedOperator Expression
        // | ID Arguments
        let next = self.peek_nth(1).clone();

        if next.is_punctuation(".") {
            let object = self.consume_id()?;
            self.consume_punctuation(".")?;
            let method = self.consume_id()?;
            let arguments = self.arguments()?;

            Ok(Statement::MethodCall {
                object,
                method,
                arguments,
            })
        } else if next.is(TokenKind::Operator, "=") {
            let target = self.consume_id()?;
            self.advance();
            let value = self.expression()?;

            Ok(Statement::Assignment { target, value })
        } else if let Some(operator) = augmented_operator(&next) {
            let target = self.consume_id()?;
            self.advance();
            let value = self.expression()?;

            Ok(Statement::AugmentedAssignment {
                target,
                operator,
                value,
            })
        } else if next.is_punctuation("(") {
            let name = self.consume_id()?;
            let arguments = self.arguments()?;

            Ok(Statement::Call { name, arguments })
        } else {
            Err(ParserError::UnrecognizedStatement(self.current_context()))
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expression>> {
        // "(" ( Expression ( "," Expression )* ","? )? ")"
        self.consume_punctuation("(")?;
        let arguments = self.expressions(")")?;
        self.consume_punctuation(")")?;

        Ok(arguments)
    }

    fn expressions(&mut self, terminator: &str) -> Result<Vec<Expression>> {
        let mut expressions = Vec::new();

        while !self.check_punctuation(terminator) {
            expressions.push(self.expression()?);

            if self.check_punctuation(",") {
                self.advance();
            } else {
                break;
            }
        }

        Ok(expressions)
    }

    fn expression(&mut self) -> Result<Expression> {
        // Term ( BinaryOperator Term )*
        self.inc_depth()?;
        trace!("{} Expression", self.dp());

        let mut expression = self.term()?;
        let mut chained = 0;

        // Each operator nests the chain one level deeper.
        while let Some(operator) = self.binary_operator() {
            self.inc_depth()?;
            chained += 1;
            self.advance();

            expression = Expression::BinaryOp {
                left: Box::new(expression),
                operator,
                right: Box::new(self.term()?),
            };
        }

        for _ in 0..=chained {
            self.dec_depth();
        }

        Ok(expression)
    }

    fn binary_operator(&mut self) -> Option<BinaryOperator> {
        let token = self.current();

        match token.kind() {
            TokenKind::Operator | TokenKind::Keyword => {
                BinaryOperator::from_expression_symbol(token.lexeme())
            }
            _ => None,
        }
    }

    fn starts_term(&mut self) -> bool {
        let token = self.current();

        match token.kind() {
            TokenKind::Constant
            | TokenKind::Literal
            | TokenKind::Identifier => true,
            TokenKind::Keyword => {
                matches!(token.lexeme(), "True" | "False" | "None" | "not")
            }
            TokenKind::Operator => matches!(token.lexeme(), "+" | "-"),
            TokenKind::Punctuation => {
                matches!(token.lexeme(), "(" | "[" | "{")
            }
            TokenKind::EndOfInput => false,
        }
    }

    fn term(&mut self) -> Result<Expression> {
        // Constant | Literal | "True" | "False" | "None"
        // | ( "+" | "-" | "not" ) Term
        // | ID Arguments? | List | Dict | "(" Expression ")" | Tuple
        self.inc_depth()?;

        let token = self.current().clone();
        trace!("{} Term: {}", self.dp(), token);

        let term = match token.kind() {
            TokenKind::Constant => self.constant()?,
            TokenKind::Literal => {
                self.advance();
                literal(token.lexeme())
            }
            TokenKind::Identifier => {
                self.advance();

                if self.check_punctuation("(") {
                    Expression::Call {
                        name: token.lexeme().to_string(),
                        arguments: self.arguments()?,
                    }
                } else {
                    Expression::Identifier {
                        name: token.lexeme().to_string(),
                    }
                }
            }
            TokenKind::Keyword => match token.lexeme() {
                "True" | "False" | "None" => {
                    self.advance();

                    let value = match token.lexeme() {
                        "True" => Constant::Bool(true),
                        "False" => Constant::Bool(false),
                        _ => Constant::None,
                    };

                    Expression::Constant { value }
                }
                "not" => self.unary(UnaryOperator::Not)?,
                _ => {
                    return Err(ParserError::UnexpectedExpression(
                        self.current_context(),
                    ))
                }
            },
            TokenKind::Operator if token.lexeme() == "+" => {
                self.unary(UnaryOperator::Plus)?
            }
            TokenKind::Operator if token.lexeme() == "-" => {
                self.unary(UnaryOperator::Minus)?
            }
            TokenKind::Punctuation if token.lexeme() == "[" => {
                self.advance();
                let elements = self.expressions("]")?;
                self.consume_punctuation("]")?;

                Expression::List { elements }
            }
            TokenKind::Punctuation if token.lexeme() == "{" => self.dict()?,
            TokenKind::Punctuation if token.lexeme() == "(" => self.group()?,
            _ => {
                return Err(ParserError::UnexpectedExpression(
                    self.current_context(),
                ))
            }
        };

        self.dec_depth();
        Ok(term)
    }

    fn unary(&mut self, operator: UnaryOperator) -> Result<Expression> {
        self.advance();

        Ok(Expression::UnaryOp {
            operator,
            operand: Box::new(self.term()?),
        })
    }

    fn constant(&mut self) -> Result<Expression> {
        let lexeme = self.current().lexeme().to_string();

        let value = if lexeme.contains('.') {
            lexeme.parse::<f64>().ok().map(Constant::Float)
        } else {
            lexeme.parse::<i64>().ok().map(Constant::Int)
        };

        match value {
            Some(value) => {
                self.advance();
                Ok(Expression::Constant { value })
            }
            None => {
                Err(ParserError::UnexpectedExpression(self.current_context()))
            }
        }
    }

    fn dict(&mut self) -> Result<Expression> {
        // "{" ( Expression ":" Expression ( "," Expression ":" Expression )* ","? )? "}"
        self.consume_punctuation("{")?;

        let mut pairs = Vec::new();

        while !self.check_punctuation("}") {
            let key = self.expression()?;
            self.consume_punctuation(":")?;
            let value = self.expression()?;
            pairs.push((key, value));

            if self.check_punctuation(",") {
                self.advance();
            } else {
                break;
            }
        }

        self.consume_punctuation("}")?;

        Ok(Expression::Dict { pairs })
    }

    fn group(&mut self) -> Result<Expression> {
        // "(" ")" | "(" Expression ")" | "(" Expression "," ( Expression ( "," Expression )* ","? )? ")"
        self.consume_punctuation("(")?;

        if self.check_punctuation(")") {
            self.advance();
            return Ok(Expression::Tuple {
                elements: Vec::new(),
            });
        }

        let first = self.expression()?;

        if self.check_punctuation(",") {
            self.advance();

            let mut elements = vec![first];
            elements.extend(self.expressions(")")?);
            self.consume_punctuation(")")?;

            Ok(Expression::Tuple { elements })
        } else {
            self.consume_punctuation(")")?;
            Ok(first)
        }
    }
}

fn augmented_operator(token: &Token) -> Option<BinaryOperator> {
    if token.kind() == TokenKind::Operator {
        BinaryOperator::from_augmented_symbol(token.lexeme())
    } else {
        None
    }
}

/// Strips the optional `f` prefix and the quotes from a literal lexeme.
fn literal(lexeme: &str) -> Expression {
    let formatted = lexeme.starts_with(['f', 'F']);
    let quoted = if formatted { &lexeme[1..] } else { lexeme };

    let value = quoted
        .get(1..quoted.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string();

    Expression::Str { value, formatted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use anyhow::{bail, Result};

    fn parse_with(source: &str, block_mode: BlockMode) -> Result<Program> {
        let tokens = tokenize(source)?.into_tokens();
        let program =
            Parser::new(tokens, ParserOptions { block_mode }).parse()?;

        Ok(program)
    }

    fn parse(source: &str) -> Result<Program> {
        parse_with(source, BlockMode::Heuristic)
    }

    fn parse_error(source: &str) -> Result<ParserError> {
        let tokens = tokenize(source)?.into_tokens();

        match Parser::new(tokens, ParserOptions::default()).parse() {
            Ok(program) => bail!("Expected ParserError, got {:?}", program),
            Err(err) => Ok(err),
        }
    }

    fn identifier(name: &str) -> Expression {
        Expression::Identifier {
            name: name.to_string(),
        }
    }

    fn int(value: i64) -> Expression {
        Expression::Constant {
            value: Constant::Int(value),
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn parser_flat_left_associative_test() -> Result<()> {
            let program = parse("x = 1 + 2 * 3")?;

            let expected = Statement::Assignment {
                target: "x".to_string(),
                value: Expression::BinaryOp {
                    left: Box::new(Expression::BinaryOp {
                        left: Box::new(int(1)),
                        operator: BinaryOperator::Add,
                        right: Box::new(int(2)),
                    }),
                    operator: BinaryOperator::Multiply,
                    right: Box::new(int(3)),
                },
            };

            assert_eq!(program.body(), [expected]);
            Ok(())
        }

        #[test]
        fn parser_unary_binds_to_term_test() -> Result<()> {
            let program = parse("x = not a and b")?;

            match &program.body()[0] {
                Statement::Assignment {
                    value:
                        Expression::BinaryOp {
                            left, operator, ..
                        },
                    ..
                } => {
                    assert_eq!(*operator, BinaryOperator::And);
                    assert_eq!(
                        **left,
                        Expression::UnaryOp {
                            operator: UnaryOperator::Not,
                            operand: Box::new(identifier("a")),
                        }
                    );
                }
                other => bail!("Expected BinaryOp assignment, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_group_and_tuple_test() -> Result<()> {
            let program = parse("a = (1)\nb = (1, 2)\nc = ()")?;

            match program.body() {
                [Statement::Assignment { value: a, .. }, Statement::Assignment { value: b, .. }, Statement::Assignment { value: c, .. }] =>
                {
                    assert_eq!(*a, int(1));
                    assert_eq!(
                        *b,
                        Expression::Tuple {
                            elements: vec![int(1), int(2)]
                        }
                    );
                    assert_eq!(
                        *c,
                        Expression::Tuple {
                            elements: Vec::new()
                        }
                    );
                }
                other => bail!("Expected three assignments, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_collections_test() -> Result<()> {
            let program = parse("d = {'a': [1, 2,], 'b': f'{x}'}")?;

            match &program.body()[0] {
                Statement::Assignment {
                    value: Expression::Dict { pairs },
                    ..
                } => {
                    assert_eq!(pairs.len(), 2);
                    assert_eq!(
                        pairs[0].1,
                        Expression::List {
                            elements: vec![int(1), int(2)]
                        }
                    );
                    assert_eq!(
                        pairs[1].1,
                        Expression::Str {
                            value: "{x}".to_string(),
                            formatted: true
                        }
                    );
                }
                other => bail!("Expected Dict assignment, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_float_constant_test() -> Result<()> {
            let program = parse("x = 2.5")?;

            assert_eq!(
                program.body(),
                [Statement::Assignment {
                    target: "x".to_string(),
                    value: Expression::Constant {
                        value: Constant::Float(2.5)
                    }
                }]
            );
            Ok(())
        }
    }

    mod statements {
        use super::*;

        #[test]
        fn parser_simple_statements_test() -> Result<()> {
            let program =
                parse("x = 1\nx += 2\nprint(x)\nitems.append(x)\npass")?;

            let expected = [
                Statement::Assignment {
                    target: "x".to_string(),
                    value: int(1),
                },
                Statement::AugmentedAssignment {
                    target: "x".to_string(),
                    operator: BinaryOperator::Add,
                    value: int(2),
                },
                Statement::Call {
                    name: "print".to_string(),
                    arguments: vec![identifier("x")],
                },
                Statement::MethodCall {
                    object: "items".to_string(),
                    method: "append".to_string(),
                    arguments: vec![identifier("x")],
                },
                Statement::Pass,
            ];

            assert_eq!(program.body(), expected);
            Ok(())
        }

        #[test]
        fn parser_function_def_test() -> Result<()> {
            let program = parse("def add(a, b):\n    return a + b")?;

            match &program.body()[0] {
                Statement::FunctionDef(function) => {
                    assert_eq!(function.name(), "add");
                    assert_eq!(function.parameters(), ["a", "b"]);
                    assert_eq!(function.body().len(), 1);
                }
                other => bail!("Expected FunctionDef, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_bare_return_test() -> Result<()> {
            let program = parse("def f():\n    return\n")?;

            match &program.body()[0] {
                Statement::FunctionDef(function) => {
                    assert_eq!(
                        function.body(),
                        [Statement::Return { value: None }]
                    );
                }
                other => bail!("Expected FunctionDef, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_if_elif_else_test() -> Result<()> {
            let source = "if a:\n    x = 1\nelif b:\n    x = 2\nelif c:\n    x = 3\nelse:\n    x = 4";
            let program = parse(source)?;

            match &program.body()[0] {
                Statement::If {
                    elif_blocks,
                    else_body,
                    ..
                } => {
                    assert_eq!(elif_blocks.len(), 2);
                    assert!(else_body.is_some());
                }
                other => bail!("Expected If, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_try_test() -> Result<()> {
            let source = "try:\n    x = 1 / 0\nexcept ZeroDivisionError as e:\n    print(e)\nexcept:\n    pass\nelse:\n    pass\nfinally:\n    print('done')";
            let program = parse(source)?;

            match &program.body()[0] {
                Statement::Try {
                    handlers,
                    else_body,
                    finally_body,
                    ..
                } => {
                    assert_eq!(handlers.len(), 2);
                    assert_eq!(
                        handlers[0].exception.as_deref(),
                        Some("ZeroDivisionError")
                    );
                    assert_eq!(handlers[0].alias.as_deref(), Some("e"));
                    assert_eq!(handlers[1].exception, None);
                    assert!(else_body.is_some());
                    assert!(finally_body.is_some());
                }
                other => bail!("Expected Try, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_import_test() -> Result<()> {
            let program = parse("import os.path as p, sys")?;

            match &program.body()[0] {
                Statement::Import { names } => {
                    assert_eq!(names.len(), 2);
                    assert_eq!(names[0].module, "os.path");
                    assert_eq!(names[0].bound_name(), "p");
                    assert_eq!(names[1].bound_name(), "sys");
                }
                other => bail!("Expected Import, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_class_with_bases_test() -> Result<()> {
            let program = parse("class A(Base):\n    x = 1")?;

            match &program.body()[0] {
                Statement::ClassDef { name, body } => {
                    assert_eq!(name, "A");
                    assert_eq!(body.len(), 1);
                }
                other => bail!("Expected ClassDef, got {:?}", other),
            }

            Ok(())
        }
    }

    mod blocks {
        use super::*;

        #[test]
        fn parser_heuristic_block_absorbs_trailing_statements_test(
        ) -> Result<()> {
            let program = parse("def f():\n    x = 1\ny = 2\nif y:\n    pass")?;

            assert_eq!(program.body().len(), 2);

            match &program.body()[0] {
                Statement::FunctionDef(function) => {
                    assert_eq!(function.body().len(), 2);
                }
                other => bail!("Expected FunctionDef, got {:?}", other),
            }

            Ok(())
        }

        #[test]
        fn parser_indentation_block_test() -> Result<()> {
            let program = parse_with(
                "def f():\n    x = 1\ny = 2",
                BlockMode::Indentation,
            )?;

            assert_eq!(program.body().len(), 2);
            Ok(())
        }

        #[test]
        fn parser_indentation_dangling_else_test() -> Result<()> {
            let source = "if a:\n    if b:\n        x = 1\nelse:\n    x = 2";
            let program = parse_with(source, BlockMode::Indentation)?;

            match &program.body()[0] {
                Statement::If {
                    body, else_body, ..
                } => {
                    assert!(else_body.is_some());
                    assert!(matches!(
                        &body[0],
                        Statement::If { else_body: None, .. }
                    ));
                }
                other => bail!("Expected If, got {:?}", other),
            }

            Ok(())
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn parser_unrecognized_statement_test() -> Result<()> {
            let error = parse_error("x = 1\n)")?;

            assert!(matches!(error, ParserError::UnrecognizedStatement(_)));
            assert_eq!(error.token_value(), ")");
            assert_eq!(error.position(), 2);
            Ok(())
        }

        #[test]
        fn parser_missing_colon_test() -> Result<()> {
            let error = parse_error("def f()\n    pass")?;

            assert!(matches!(error, ParserError::UnexpectedToken { .. }));
            assert_eq!(error.token_kind(), TokenKind::Keyword);
            assert_eq!(error.token_value(), "pass");
            Ok(())
        }

        #[test]
        fn parser_unexpected_expression_at_end_test() -> Result<()> {
            let error = parse_error("x = ")?;

            assert!(matches!(error, ParserError::UnexpectedExpression(_)));
            assert_eq!(error.token_kind(), TokenKind::EndOfInput);
            Ok(())
        }

        #[test]
        fn parser_max_depth_test() -> Result<()> {
            let source = format!("x = {}1{}", "(".repeat(80), ")".repeat(80));
            let error = parse_error(&source)?;

            assert!(matches!(error, ParserError::MaxDepth { .. }));
            Ok(())
        }

        #[test]
        fn parser_long_operator_chain_test() -> Result<()> {
            let source = format!("x = 1{}", " + 1".repeat(3000));
            let error = parse_error(&source)?;

            assert!(matches!(error, ParserError::MaxDepth { .. }));

            let source = format!("x = 1{}\ny = 2", " + 1".repeat(40));
            let program = parse(&source)?;

            assert_eq!(program.body().len(), 2);
            Ok(())
        }
    }
}
