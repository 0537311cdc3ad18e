//! Abstract syntax tree produced by the [parser](crate::parser).
//!
//! Every [Statement] and [Expression] variant carries the [Token] it originated from (mostly
//! useful for error messages and the odd bit of debugging); [Display] reprints the tree in a
//! fully-parenthesized form so precedence bugs show up immediately in tests.

use std::fmt;

use crate::token::Token;

/// A complete parsed program: an ordered sequence of top-level statements.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// A block of statements, e.g. the body of an `if` branch or a function.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Expression,
    },
    Expression {
        token: Token,
        expression: Expression,
    },
    Block(Block),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {name} = {value};"),
            Statement::Return { value, .. } => write!(f, "return {value};"),
            Statement::Expression { expression, .. } => write!(f, "{expression}"),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}

/// A bare identifier, e.g. `x` in `let x = 5;` or as a standalone expression.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: Block,
    },
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{ident}"),
            Expression::IntegerLiteral { value, .. } => write!(f, "{value}"),
            Expression::StringLiteral { value, .. } => write!(f, "{value}"),
            Expression::Boolean { value, .. } => write!(f, "{value}"),
            Expression::ArrayLiteral { elements, .. } => {
                let rendered: Vec<_> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Expression::HashLiteral { pairs, .. } => {
                let rendered: Vec<_> = pairs.iter().map(|(k, v)| format!("{k}:{v}")).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Expression::FunctionLiteral {
                token,
                parameters,
                body,
            } => {
                let rendered: Vec<_> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "{}({}) {{ {} }}", token.literal, rendered.join(", "), body)
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({operator}{right})"),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let rendered: Vec<_> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{function}({})", rendered.join(", "))
            }
            Expression::Index { left, index, .. } => write!(f, "({left}[{index}])"),
        }
    }
}
