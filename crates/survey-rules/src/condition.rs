//! Condition expression language: parser and evaluator.
//!
//! Grammar:
//! ```text
//! ConditionExpr  ::= Clause ( '&&' Clause )*
//! Clause         ::= Key Operator Literal
//! Key            ::= identifier
//! Operator       ::= '=' | '!=' | '>=' | '<=' | '>' | '<' | '~'
//! Literal        ::= QuotedString | BareWord | Number | Boolean
//! ```
//!
//! Keys name [`GeologicalInput`](survey_types::GeologicalInput) fields in
//! camelCase. `~` tests list membership (or substring for text fields).

use survey_types::input::FieldValue;
use survey_types::SurveyError;

/// A parsed condition expression consisting of one or more clauses joined by `&&`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpr {
    pub clauses: Vec<Clause>,
}

/// A single comparison clause: `key op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub key: String,
    pub operator: Operator,
    pub value: String,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Ge,
    Le,
    Gt,
    Lt,
    Contains,
}

/// Parse a condition string into a [`ConditionExpr`].
///
/// An empty or whitespace-only input produces an expression with zero clauses,
/// which [`evaluate_condition`] treats as always true.
pub fn parse_condition(input: &str) -> Result<ConditionExpr, SurveyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(ConditionExpr {
            clauses: Vec::new(),
        });
    }

    let clauses = trimmed
        .split("&&")
        .map(parse_clause)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|message| SurveyError::ConditionParse {
            expression: trimmed.to_string(),
            message,
        })?;

    Ok(ConditionExpr { clauses })
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn parse_clause(input: &str) -> Result<Clause, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty clause".to_string());
    }

    let (key_end, operator, op_len) = find_operator(input)?;

    let key = input[..key_end].trim().to_string();
    if key.is_empty() {
        return Err("missing key before operator".to_string());
    }
    if !is_identifier(&key) {
        return Err(format!("invalid key '{key}'"));
    }

    let raw_value = input[key_end + op_len..].trim();
    if raw_value.is_empty() {
        return Err(format!("missing value after operator in '{input}'"));
    }

    let value = strip_quotes(raw_value);
    if matches!(
        operator,
        Operator::Ge | Operator::Le | Operator::Gt | Operator::Lt
    ) && value.parse::<f64>().is_err()
    {
        return Err(format!("ordering comparison needs a number, got '{value}'"));
    }

    Ok(Clause {
        key,
        operator,
        value,
    })
}

fn find_operator(input: &str) -> Result<(usize, Operator, usize), String> {
    // Scan for the first operator, skipping quoted regions.
    let bytes = input.as_bytes();
    let next_is_eq = |i: usize| i + 1 < bytes.len() && bytes[i + 1] == b'=';
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                i += 1; // skip closing quote
            }
            b'!' if next_is_eq(i) => return Ok((i, Operator::NotEq, 2)),
            b'>' if next_is_eq(i) => return Ok((i, Operator::Ge, 2)),
            b'<' if next_is_eq(i) => return Ok((i, Operator::Le, 2)),
            b'>' => return Ok((i, Operator::Gt, 1)),
            b'<' => return Ok((i, Operator::Lt, 1)),
            b'=' => return Ok((i, Operator::Eq, 1)),
            b'~' => return Ok((i, Operator::Contains, 1)),
            _ => {
                i += 1;
            }
        }
    }
    Err(format!("no operator found in '{input}'"))
}

fn strip_quotes(s: &str) -> String {
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
        {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn clause_holds(clause: &Clause, actual: Option<FieldValue>) -> bool {
    let literal = clause.value.as_str();
    let number = || literal.parse::<f64>().ok();
    match clause.operator {
        Operator::Eq => equals(actual.as_ref(), literal),
        Operator::NotEq => !equals(actual.as_ref(), literal),
        Operator::Ge | Operator::Le | Operator::Gt | Operator::Lt => {
            let (Some(FieldValue::Number(n)), Some(rhs)) = (actual, number()) else {
                return false;
            };
            match clause.operator {
                Operator::Ge => n >= rhs,
                Operator::Le => n <= rhs,
                Operator::Gt => n > rhs,
                _ => n < rhs,
            }
        }
        Operator::Contains => match actual {
            Some(FieldValue::List(items)) => items.iter().any(|s| same_text(s, literal)),
            Some(FieldValue::Text(s)) => s.to_lowercase().contains(&literal.to_lowercase()),
            _ => false,
        },
    }
}

fn equals(actual: Option<&FieldValue>, literal: &str) -> bool {
    match actual {
        // Absent fields read as "false".
        None => literal == "false",
        Some(FieldValue::Text(s)) => same_text(s, literal),
        Some(FieldValue::Number(n)) => literal.parse::<f64>().is_ok_and(|rhs| *n == rhs),
        Some(FieldValue::Flag(b)) => literal.parse::<bool>().is_ok_and(|rhs| *b == rhs),
        Some(FieldValue::List(items)) => items.iter().any(|s| same_text(s, literal)),
    }
}

/// Evaluate a condition expression against values provided by a resolver function.
///
/// The `resolve` function maps a key (e.g. `"hasGroundwater"`) to its typed
/// value, or `None` when the field is absent. Evaluation never fails: a clause
/// over an absent field is simply false (except `key=false` / `key!=...`).
///
/// An expression with zero clauses (from an empty input) evaluates to `true`.
pub fn evaluate_condition(
    expr: &ConditionExpr,
    resolve: &dyn Fn(&str) -> Option<FieldValue>,
) -> bool {
    if expr.clauses.is_empty() {
        return true;
    }

    expr.clauses
        .iter()
        .all(|clause| clause_holds(clause, resolve(&clause.key)))
}
