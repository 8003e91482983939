use crate::expr::Expr;

/// Renders an expression tree as parenthesized prefix notation, e.g.
/// `(+ 1 (* 2 3))`. Exists for debugging a parse by eye; not used by
/// the interpreter itself.
pub struct Printer;

impl Printer {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Assign(data) => Printer::parenthesize(&format!("= {}", data.name.lexeme), &[&data.value]),
            Expr::Binary(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.left, &data.right]),
            Expr::Call(data) => {
                let mut parts = vec![&data.callee];
                parts.extend(data.arguments.iter());
                Printer::parenthesize("call", &parts)
            }
            Expr::Function(data) => format!("(fun {})", data.name.lexeme),
            Expr::Get(data) => Printer::parenthesize(&format!(". {}", data.name.lexeme), &[&data.object]),
            Expr::Grouping(data) => Printer::parenthesize("group", &[&data.expression]),
            Expr::Literal(data) => data.value.to_string(),
            Expr::Logical(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.left, &data.right]),
            Expr::Set(data) => Printer::parenthesize(&format!("set {}", data.name.lexeme), &[&data.object, &data.value]),
            Expr::Super(data) => format!("(super.{})", data.method.lexeme),
            Expr::Ternary(data) => {
                Printer::parenthesize("?:", &[&data.condition, &data.then_branch, &data.else_branch])
            }
            Expr::This(_) => "this".to_string(),
            Expr::Unary(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.right]),
            Expr::Variable(data) => data.name.lexeme.clone(),
        }
    }

    fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
        let mut out = String::new();
        out.push('(');
        out.push_str(name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&Printer::print(expr));
        }
        out.push(')');
        out
    }
}
