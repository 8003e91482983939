use std::rc::Rc;

use crate::expr::{Expr, FunctionData};
use crate::token::Token;

/// A statement node. Like `Expr`, every variant is a cheap `Rc` clone.
#[derive(Clone)]
pub enum Stmt {
    Block(Rc<BlockData>),
    Break(Rc<BreakData>),
    Class(Rc<ClassData>),
    Expression(Rc<ExpressionData>),
    Function(Rc<FunctionData>),
    If(Rc<IfData>),
    Print(Rc<PrintData>),
    Return(Rc<ReturnData>),
    Var(Rc<VarData>),
    While(Rc<WhileData>),
}

pub struct BlockData {
    pub statements: Vec<Stmt>,
}

pub struct BreakData {
    pub keyword: Token,
}

pub struct ClassData {
    pub name: Token,
    /// Must resolve to a `Variable` expression naming another class.
    pub superclass: Option<Expr>,
    pub methods: Vec<Rc<FunctionData>>,
}

pub struct ExpressionData {
    pub expression: Expr,
}

pub struct IfData {
    pub condition: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
}

pub struct PrintData {
    pub expression: Expr,
}

pub struct ReturnData {
    pub keyword: Token,
    pub value: Option<Expr>,
}

pub struct VarData {
    pub name: Token,
    pub initializer: Option<Expr>,
}

pub struct WhileData {
    pub condition: Expr,
    pub body: Stmt,
}
