//! `calc()` expressions.
//!
//! [§ 10 Mathematical Expressions](https://www.w3.org/TR/css-values-4/#calc-func)
//!
//! A `calc()` value is parsed into a [`CalcExpr`] tree. Sub-expressions
//! whose operands are already commensurable fold immediately; anything
//! involving a percentage mixed with another kind stays deferred until
//! layout supplies the percentage reference.
//!
//! Type inference over operators:
//! - `+`/`-` yield the non-percentage operand's kind (or percentage when
//!   both are), and require the kinds to match unless one is a percentage;
//! - `*`/`/` yield the non-number operand's kind.

use serde::Serialize;

use super::{Accept, ComputedValue, scan};

/// The kind of a calc operand or (inferred) sub-expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalcKind {
    /// A length in px.
    Length,
    /// A percentage awaiting its reference.
    Percentage,
    /// An angle in degrees.
    Angle,
    /// A unitless number.
    Number,
}

/// A calc arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalcOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl std::fmt::Display for CalcOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        };
        write!(f, "{s}")
    }
}

/// A (possibly deferred) calc expression tree.
///
/// Leaves carry canonicalized numbers; an `Op` node survives folding only
/// when its operands cannot be combined yet (a percentage mixed with
/// another kind, or a deferred sub-expression).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CalcExpr {
    /// A resolved length in px.
    Length(f32),
    /// A percentage.
    Percentage(f32),
    /// An angle in degrees.
    Angle(f32),
    /// A unitless number.
    Number(f32),
    /// A deferred binary operation.
    Op {
        /// Left operand.
        left: Box<CalcExpr>,
        /// The operator.
        op: CalcOp,
        /// Right operand.
        right: Box<CalcExpr>,
    },
}

impl Eq for CalcExpr {}

#[allow(clippy::derived_hash_with_manual_eq)]
impl std::hash::Hash for CalcExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Length(v) | Self::Percentage(v) | Self::Angle(v) | Self::Number(v) => {
                v.to_bits().hash(state);
            }
            Self::Op { left, op, right } => {
                left.hash(state);
                op.hash(state);
                right.hash(state);
            }
        }
    }
}

impl std::fmt::Display for CalcExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(v) => write!(f, "{v}px"),
            Self::Percentage(v) => write!(f, "{v}%"),
            Self::Angle(v) => write!(f, "{v}deg"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Op { left, op, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

impl CalcExpr {
    /// The inferred kind of this expression.
    #[must_use]
    pub fn kind(&self) -> CalcKind {
        match self {
            Self::Length(_) => CalcKind::Length,
            Self::Percentage(_) => CalcKind::Percentage,
            Self::Angle(_) => CalcKind::Angle,
            Self::Number(_) => CalcKind::Number,
            Self::Op { left, op, right } => match op {
                CalcOp::Add | CalcOp::Sub => {
                    let l = left.kind();
                    if l == CalcKind::Percentage { right.kind() } else { l }
                }
                CalcOp::Mul | CalcOp::Div => {
                    let l = left.kind();
                    if l == CalcKind::Number { right.kind() } else { l }
                }
            },
        }
    }

    fn leaf(kind: CalcKind, value: f32) -> Self {
        match kind {
            CalcKind::Length => Self::Length(value),
            CalcKind::Percentage => Self::Percentage(value),
            CalcKind::Angle => Self::Angle(value),
            CalcKind::Number => Self::Number(value),
        }
    }

    fn as_leaf(&self) -> Option<(CalcKind, f32)> {
        match self {
            Self::Length(v) => Some((CalcKind::Length, *v)),
            Self::Percentage(v) => Some((CalcKind::Percentage, *v)),
            Self::Angle(v) => Some((CalcKind::Angle, *v)),
            Self::Number(v) => Some((CalcKind::Number, *v)),
            Self::Op { .. } => None,
        }
    }

    /// Convert a fully folded expression into a [`ComputedValue`]; a
    /// surviving `Op` becomes a deferred [`ComputedValue::Calc`].
    #[must_use]
    pub fn into_value(self) -> ComputedValue {
        match self {
            Self::Length(v) => ComputedValue::Length(v),
            Self::Percentage(v) => ComputedValue::Percentage(v),
            Self::Angle(v) => ComputedValue::Angle(v),
            Self::Number(v) => ComputedValue::Number(v),
            op @ Self::Op { .. } => ComputedValue::Calc(op),
        }
    }
}

/// Combine two sub-expressions under an operator, folding when the operands
/// are commensurable. `None` means the whole expression is invalid.
fn combine(op: CalcOp, left: CalcExpr, right: CalcExpr) -> Option<CalcExpr> {
    let (lk, rk) = (left.kind(), right.kind());
    match op {
        CalcOp::Add | CalcOp::Sub => {
            // "+/- require matching kinds unless a percentage is involved"
            if lk != rk && lk != CalcKind::Percentage && rk != CalcKind::Percentage {
                return None;
            }
            if let (Some((k1, v1)), Some((k2, v2))) = (left.as_leaf(), right.as_leaf()) {
                if k1 == k2 {
                    let v = if op == CalcOp::Add { v1 + v2 } else { v1 - v2 };
                    return Some(CalcExpr::leaf(k1, v));
                }
            }
            Some(CalcExpr::Op {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
        }
        CalcOp::Mul => {
            if let (Some((k1, v1)), Some((k2, v2))) = (left.as_leaf(), right.as_leaf()) {
                if k1 == CalcKind::Number {
                    return Some(CalcExpr::leaf(k2, v1 * v2));
                }
                if k2 == CalcKind::Number {
                    return Some(CalcExpr::leaf(k1, v1 * v2));
                }
            }
            Some(CalcExpr::Op {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
        }
        CalcOp::Div => {
            if let Some((CalcKind::Number, divisor)) = right.as_leaf() {
                if divisor == 0.0 {
                    return None;
                }
                if let Some((k1, v1)) = left.as_leaf() {
                    return Some(CalcExpr::leaf(k1, v1 / divisor));
                }
            }
            Some(CalcExpr::Op {
                left: Box::new(left),
                op,
                right: Box::new(right),
            })
        }
    }
}

#[derive(Debug, Clone)]
enum Tok {
    Open,
    Close,
    Op(CalcOp),
    Val(CalcExpr),
}

/// Lex the inside of a calc expression.
///
/// Dimensions are handed to `resolve_unit`, which maps `(number, unit)` to
/// a leaf (or reports the value deferred/invalid). A `+`/`-` is an operator
/// only after a value or closing paren; otherwise it is the sign of the
/// following number, mirroring CSS's whitespace rules closely enough for
/// the accepted grammar.
fn lex(text: &str, resolve_unit: &dyn Fn(f32, &str) -> Accept) -> Result<Vec<Tok>, Accept> {
    let mut toks: Vec<Tok> = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(r) = rest.strip_prefix("calc(").or_else(|| rest.strip_prefix('(')) {
            toks.push(Tok::Open);
            rest = r.trim_start();
            continue;
        }
        if let Some(r) = rest.strip_prefix(')') {
            toks.push(Tok::Close);
            rest = r.trim_start();
            continue;
        }
        let after_value = matches!(toks.last(), Some(Tok::Val(_) | Tok::Close));
        let first = rest.chars().next().unwrap_or_default();
        let op = match first {
            '*' => Some(CalcOp::Mul),
            '/' => Some(CalcOp::Div),
            '+' if after_value => Some(CalcOp::Add),
            '-' if after_value => Some(CalcOp::Sub),
            _ => None,
        };
        if let Some(op) = op {
            toks.push(Tok::Op(op));
            rest = rest[1..].trim_start();
            continue;
        }
        // a dimension, number, or literal
        let end = rest
            .char_indices()
            .find(|&(i, c)| {
                c.is_ascii_whitespace()
                    || matches!(c, '(' | ')' | '*' | '/')
                    || (matches!(c, '+' | '-') && i > 0 && !prev_is_exponent(rest, i))
            })
            .map_or(rest.len(), |(i, _)| i);
        let word = &rest[..end];
        if word.is_empty() {
            return Err(Accept::Invalid);
        }
        let value = match word {
            "pi" => CalcExpr::Number(std::f32::consts::PI),
            "e" => CalcExpr::Number(std::f32::consts::E),
            _ => {
                if let Some((num, unit)) = scan::split_units(word) {
                    match resolve_unit(num, &unit) {
                        Accept::Value(v) => match computed_to_expr(v) {
                            Some(expr) => expr,
                            None => return Err(Accept::Invalid),
                        },
                        other => return Err(other),
                    }
                } else if let Some(num) = scan::parse_number(word) {
                    CalcExpr::Number(num)
                } else {
                    return Err(Accept::Invalid);
                }
            }
        };
        toks.push(Tok::Val(value));
        rest = rest[end..].trim_start();
    }
    Ok(toks)
}

fn prev_is_exponent(text: &str, i: usize) -> bool {
    text[..i]
        .chars()
        .next_back()
        .is_some_and(|c| c == 'e' || c == 'E')
        && text[..i].chars().any(|c| c.is_ascii_digit())
}

fn computed_to_expr(v: ComputedValue) -> Option<CalcExpr> {
    match v {
        ComputedValue::Length(x) => Some(CalcExpr::Length(x)),
        ComputedValue::Percentage(x) => Some(CalcExpr::Percentage(x)),
        ComputedValue::Angle(x) => Some(CalcExpr::Angle(x)),
        ComputedValue::Number(x) => Some(CalcExpr::Number(x)),
        _ => None,
    }
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// sum := product (('+' | '-') product)*
    fn parse_sum(&mut self) -> Option<CalcExpr> {
        let mut left = self.parse_product()?;
        while let Some(Tok::Op(op @ (CalcOp::Add | CalcOp::Sub))) = self.peek() {
            let op = *op;
            let _ = self.bump();
            let right = self.parse_product()?;
            left = combine(op, left, right)?;
        }
        Some(left)
    }

    /// product := atom (('*' | '/') atom)*
    fn parse_product(&mut self) -> Option<CalcExpr> {
        let mut left = self.parse_atom()?;
        while let Some(Tok::Op(op @ (CalcOp::Mul | CalcOp::Div))) = self.peek() {
            let op = *op;
            let _ = self.bump();
            let right = self.parse_atom()?;
            left = combine(op, left, right)?;
        }
        Some(left)
    }

    /// atom := '(' sum ')' | value
    fn parse_atom(&mut self) -> Option<CalcExpr> {
        match self.bump()? {
            Tok::Open => {
                let inner = self.parse_sum()?;
                match self.bump()? {
                    Tok::Close => Some(inner),
                    _ => None,
                }
            }
            Tok::Val(v) => Some(v),
            _ => None,
        }
    }
}

/// Parse a full `calc(...)` value string.
///
/// `resolve_unit` maps dimensions (number + unit) inside the expression to
/// leaves, letting the caller restrict the accepted unit families and
/// resolve context-dependent units (`em`, `vw`, ...). Returns the folded
/// value, [`Accept::Deferred`] when a unit needs missing parent context,
/// or [`Accept::Invalid`].
#[must_use]
pub fn accept_calc(value: &str, resolve_unit: &dyn Fn(f32, &str) -> Accept) -> Accept {
    let Some(args) = scan::css_func(value, "calc", false) else {
        return Accept::Invalid;
    };
    let toks = match lex(args[0], resolve_unit) {
        Ok(toks) => toks,
        Err(outcome) => return outcome,
    };
    let mut parser = Parser { toks, pos: 0 };
    let Some(expr) = parser.parse_sum() else {
        return Accept::Invalid;
    };
    if parser.pos != parser.toks.len() {
        return Accept::Invalid;
    }
    Accept::Value(expr.into_value())
}

/// A context-free unit resolver for number/percentage/angle positions
/// (color components, hues). Lengths are rejected.
#[must_use]
pub fn numeric_units(num: f32, unit: &str) -> Accept {
    if unit == "%" {
        return Accept::Value(ComputedValue::Percentage(num));
    }
    super::angle_factor(unit).map_or(Accept::Invalid, |f| {
        Accept::Value(ComputedValue::Angle(num * f))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px_units(num: f32, unit: &str) -> Accept {
        match unit {
            "%" => Accept::Value(ComputedValue::Percentage(num)),
            "px" => Accept::Value(ComputedValue::Length(num)),
            _ => Accept::Invalid,
        }
    }

    #[test]
    fn folds_pure_arithmetic() {
        let v = accept_calc("calc(2 * 3 + 4)", &px_units);
        assert_eq!(v, Accept::Value(ComputedValue::Number(10.0)));
    }

    #[test]
    fn respects_parentheses() {
        let v = accept_calc("calc(2 * (3 + 4))", &px_units);
        assert_eq!(v, Accept::Value(ComputedValue::Number(14.0)));
    }

    #[test]
    fn folds_lengths() {
        let v = accept_calc("calc(10px + 5px)", &px_units);
        assert_eq!(v, Accept::Value(ComputedValue::Length(15.0)));
    }

    #[test]
    fn defers_mixed_percentage() {
        let v = accept_calc("calc(100% - 30px)", &px_units);
        let Accept::Value(ComputedValue::Calc(expr)) = v else {
            panic!("expected deferred calc, got {v:?}");
        };
        assert_eq!(expr.kind(), CalcKind::Length);
    }

    #[test]
    fn rejects_incommensurable_addition() {
        assert_eq!(accept_calc("calc(10px + 3)", &px_units), Accept::Invalid);
    }

    #[test]
    fn rejects_division_by_zero() {
        assert_eq!(accept_calc("calc(10px / 0)", &px_units), Accept::Invalid);
    }

    #[test]
    fn knows_literals() {
        let Accept::Value(ComputedValue::Number(v)) = accept_calc("calc(pi * 2)", &px_units)
        else {
            panic!("expected number");
        };
        assert!((v - 2.0 * std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn signs_vs_operators() {
        // "-" directly before a number with no preceding value is a sign
        let v = accept_calc("calc(-5px + 10px)", &px_units);
        assert_eq!(v, Accept::Value(ComputedValue::Length(5.0)));
    }
}
