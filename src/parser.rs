use std::rc::Rc;

use crate::error::{Diagnostics, ParseError};
use crate::expr::{
    AssignData, BinaryData, CallData, Expr, FunctionData, GetData, GroupingData, LiteralData, LogicalData, SetData,
    SuperData, TernaryData, ThisData, UnaryData, VariableData,
};
use crate::object::Object;
use crate::stmt::{
    BlockData, BreakData, ClassData, ExpressionData, IfData, PrintData, ReturnData, Stmt, VarData, WhileData,
};
use crate::token::{Location, Token, TokenLiteral, Type};

const MAX_ARGS: usize = 255;

/// Recursive-descent parser with panic-mode error recovery: a malformed
/// declaration reports its error and resynchronizes at the next
/// statement boundary instead of aborting the whole parse.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'a Diagnostics,
}

type ExprResult = Result<Expr, ParseError>;
type StmtResult = Result<Stmt, ParseError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'a Diagnostics) -> Self {
        Parser { tokens, current: 0, diagnostics }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    /// Parses a single expression with no trailing semicolon or EOF
    /// requirement. Used only by the REPL's bare-expression fallback:
    /// when a line fails as a statement, the driver re-parses it as a
    /// standalone expression so `> 1 + 2` can print `3` without `print`.
    pub fn parse_expression_only(&mut self) -> ExprResult {
        self.expression()
    }

    // ---- declarations ----

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_type(Type::Class) {
            self.class_declaration()
        } else if self.match_type(Type::Fun) {
            self.function_declaration("function")
        } else if self.match_type(Type::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.diagnostics.report(&err);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> StmtResult {
        let name = self.consume(Type::Identifier, "Expect class name.")?.clone();

        let superclass = if self.match_type(Type::Less) {
            let superclass_name = self.consume(Type::Identifier, "Expect superclass name.")?.clone();
            Some(Expr::Variable(Rc::new(VariableData { name: superclass_name, depth: Default::default() })))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(Rc::new(ClassData { name, superclass, methods })))
    }

    fn function_declaration(&mut self, kind: &str) -> StmtResult {
        let data = self.function(kind)?;
        Ok(Stmt::Function(data))
    }

    /// Parses one `name(params) { body }` (or `name { body }` for a
    /// getter). Shared by top-level `fun` declarations and class
    /// methods.
    fn function(&mut self, kind: &str) -> Result<Rc<FunctionData>, ParseError> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?.clone();

        // A getter omits the parameter list entirely: `name { ... }`.
        let is_getter = kind == "method" && !self.check(Type::LeftParen);

        let params = if is_getter {
            Vec::new()
        } else {
            self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;
            let mut params = Vec::new();
            if !self.check(Type::RightParen) {
                loop {
                    if params.len() >= MAX_ARGS {
                        let token = self.peek().clone();
                        self.diagnostics.report(&ParseError {
                            token,
                            message: format!("Can't have more than {MAX_ARGS} parameters."),
                        });
                    }
                    params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());
                    if !self.match_type(Type::Comma) {
                        break;
                    }
                }
            }
            self.consume(Type::RightParen, "Expect ')' after parameters.")?;
            params
        };

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Rc::new(FunctionData { name, params, body, is_getter }))
    }

    fn var_declaration(&mut self) -> StmtResult {
        let name = self.consume(Type::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.match_type(Type::Equal) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(Rc::new(VarData { name, initializer })))
    }

    // ---- statements ----

    fn statement(&mut self) -> StmtResult {
        if self.match_type(Type::For) {
            self.for_statement()
        } else if self.match_type(Type::If) {
            self.if_statement()
        } else if self.match_type(Type::Print) {
            self.print_statement()
        } else if self.match_type(Type::Return) {
            self.return_statement()
        } else if self.match_type(Type::Break) {
            self.break_statement()
        } else if self.match_type(Type::While) {
            self.while_statement()
        } else if self.match_type(Type::LeftBrace) {
            Ok(Stmt::Block(Rc::new(BlockData { statements: self.block()? })))
        } else {
            self.expression_statement()
        }
    }

    fn for_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_type(Type::Semicolon) {
            None
        } else if self.match_type(Type::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(Rc::new(BlockData {
                statements: vec![body, Stmt::Expression(Rc::new(ExpressionData { expression: increment }))],
            }));
        }

        let condition = condition.unwrap_or_else(|| {
            Expr::Literal(Rc::new(LiteralData { value: Object::Bool(true) }))
        });
        body = Stmt::While(Rc::new(WhileData { condition, body }));

        if let Some(initializer) = initializer {
            body = Stmt::Block(Rc::new(BlockData { statements: vec![initializer, body] }));
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = self.statement()?;
        let else_branch = if self.match_type(Type::Else) { Some(self.statement()?) } else { None };

        Ok(Stmt::If(Rc::new(IfData { condition, then_branch, else_branch })))
    }

    fn print_statement(&mut self) -> StmtResult {
        let value = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(Rc::new(PrintData { expression: value })))
    }

    fn return_statement(&mut self) -> StmtResult {
        let keyword = self.previous().clone();
        let value = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(Rc::new(ReturnData { keyword, value })))
    }

    fn break_statement(&mut self) -> StmtResult {
        let keyword = self.previous().clone();
        self.consume(Type::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break(Rc::new(BreakData { keyword })))
    }

    fn while_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Ok(Stmt::While(Rc::new(WhileData { condition, body })))
    }

    fn expression_statement(&mut self) -> StmtResult {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(Rc::new(ExpressionData { expression: expr })))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ---- expressions ----

    fn expression(&mut self) -> ExprResult {
        self.assignment()
    }

    fn assignment(&mut self) -> ExprResult {
        let expr = self.ternary()?;

        if self.match_type(Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => {
                    Ok(Expr::Assign(Rc::new(AssignData { name: data.name.clone(), value, depth: Default::default() })))
                }
                Expr::Get(data) => {
                    Ok(Expr::Set(Rc::new(SetData { object: data.object.clone(), name: data.name.clone(), value })))
                }
                _ => Err(ParseError { token: equals, message: "Invalid assignment target.".to_string() }),
            };
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> ExprResult {
        let condition = self.or()?;

        if self.match_type(Type::Question) {
            let question = self.previous().clone();
            let then_branch = self.expression()?;
            self.consume(Type::Colon, "Expect ':' after '?' branch.")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary(Rc::new(TernaryData { condition, question, then_branch, else_branch })));
        }

        Ok(condition)
    }

    fn or(&mut self) -> ExprResult {
        let mut expr = self.and()?;
        while self.match_type(Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(Rc::new(LogicalData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn and(&mut self) -> ExprResult {
        let mut expr = self.equality()?;
        while self.match_type(Type::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Rc::new(LogicalData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ExprResult {
        let mut expr = self.comparison()?;
        while self.match_types(&[Type::BangEqual, Type::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Rc::new(BinaryData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ExprResult {
        let mut expr = self.term()?;
        while self.match_types(&[Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(Rc::new(BinaryData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn term(&mut self) -> ExprResult {
        let mut expr = self.factor()?;
        while self.match_types(&[Type::Minus, Type::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(Rc::new(BinaryData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ExprResult {
        let mut expr = self.unary()?;
        while self.match_types(&[Type::Slash, Type::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Rc::new(BinaryData { left: expr, operator, right }));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ExprResult {
        if self.match_types(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(Rc::new(UnaryData { operator, right })));
        }
        self.call()
    }

    fn call(&mut self) -> ExprResult {
        let mut expr = self.primary()?;

        loop {
            if self.match_type(Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_type(Type::Dot) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(Rc::new(GetData { object: expr, name }));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ExprResult {
        let mut arguments = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.diagnostics.report(&ParseError {
                        token,
                        message: format!("Can't have more than {MAX_ARGS} arguments."),
                    });
                }
                arguments.push(self.expression()?);
                if !self.match_type(Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?.clone();
        Ok(Expr::Call(Rc::new(CallData { callee, paren, arguments })))
    }

    fn primary(&mut self) -> ExprResult {
        if self.match_type(Type::False) {
            return Ok(Expr::Literal(Rc::new(LiteralData { value: Object::Bool(false) })));
        }
        if self.match_type(Type::True) {
            return Ok(Expr::Literal(Rc::new(LiteralData { value: Object::Bool(true) })));
        }
        if self.match_type(Type::Nil) {
            return Ok(Expr::Literal(Rc::new(LiteralData { value: Object::Nil })));
        }

        if self.match_type(Type::Number) {
            let literal = self.previous().literal.clone().expect("number token must carry a literal");
            let value = match literal {
                TokenLiteral::Integer(n) => Object::Number(crate::object::Number::Integer(n)),
                TokenLiteral::Float(n) => Object::Number(crate::object::Number::Float(n)),
                TokenLiteral::Str(_) => unreachable!("number token cannot carry a string literal"),
            };
            return Ok(Expr::Literal(Rc::new(LiteralData { value })));
        }

        if self.match_type(Type::String) {
            let literal = self.previous().literal.clone().expect("string token must carry a literal");
            let TokenLiteral::Str(s) = literal else { unreachable!("string token must carry a string literal") };
            return Ok(Expr::Literal(Rc::new(LiteralData { value: Object::string(s) })));
        }

        if self.match_type(Type::Super) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?.clone();
            return Ok(Expr::Super(Rc::new(SuperData { keyword, method, depth: Default::default() })));
        }

        if self.match_type(Type::This) {
            let keyword = self.previous().clone();
            return Ok(Expr::This(Rc::new(ThisData { keyword, depth: Default::default() })));
        }

        if self.match_type(Type::Identifier) {
            let name = self.previous().clone();
            return Ok(Expr::Variable(Rc::new(VariableData { name, depth: Default::default() })));
        }

        if self.match_type(Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Rc::new(GroupingData { expression: expr })));
        }

        if self.match_type(Type::Fun) {
            return self.anonymous_function();
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression.".to_string() })
    }

    fn anonymous_function(&mut self) -> ExprResult {
        let location = self.previous().location;
        let name = Token::new(
            Type::Identifier,
            format!("anonymous_function_at_line_{}", location.line),
            None,
            location,
        );

        self.consume(Type::LeftParen, "Expect '(' after 'fun'.")?;
        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.diagnostics.report(&ParseError {
                        token,
                        message: format!("Can't have more than {MAX_ARGS} parameters."),
                    });
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());
                if !self.match_type(Type::Comma) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;
        self.consume(Type::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;

        Ok(Expr::Function(Rc::new(FunctionData { name, params, body, is_getter: false })))
    }

    // ---- token-stream plumbing ----

    fn match_type(&mut self, r#type: Type) -> bool {
        if self.check(r#type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_types(&mut self, types: &[Type]) -> bool {
        types.iter().any(|t| self.check(*t)) && {
            self.advance();
            true
        }
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, r#type: Type, message: &str) -> Result<&Token, ParseError> {
        if self.check(r#type) {
            return Ok(self.advance());
        }
        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    /// Discards tokens until the start of what looks like the next
    /// statement, so one bad declaration doesn't cascade into spurious
    /// errors for everything after it.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class
                | Type::Fun
                | Type::Var
                | Type::For
                | Type::If
                | Type::While
                | Type::Print
                | Type::Return
                | Type::Break => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
