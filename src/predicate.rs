use std::ops::{BitAnd, BitOr, Not};

use crate::statement::SqlWriter;
use crate::types::RowValues;

/// Boolean filter over an entity's columns.
///
/// Built from [`col`] and combined with [`Predicate::and`] / [`Predicate::or`] or the `&`, `|`
/// and `!` operators. Values are always bound as statement parameters.
///
/// ```rust
/// use sql_crud::prelude::*;
///
/// let open_and_recent = col("done").eq(false) & (col("id").gt(10) | col("pinned").eq(true));
/// let not_archived = !col("archived_at").is_not_null();
/// # let _ = (open_and_recent, not_archived);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        op: CompareOp,
        value: RowValues,
    },
    IsNull {
        column: String,
        negated: bool,
    },
    InList {
        column: String,
        values: Vec<RowValues>,
        negated: bool,
    },
    Like {
        column: String,
        pattern: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Literal(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Column reference, the starting point of every predicate.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
}

/// Reference a column by name.
#[must_use]
pub fn col(name: impl Into<String>) -> Column {
    Column { name: name.into() }
}

impl Column {
    fn compare(self, op: CompareOp, value: impl Into<RowValues>) -> Predicate {
        Predicate::Compare {
            column: self.name,
            op,
            value: value.into(),
        }
    }

    /// `column = value`; comparing with `NULL` renders `IS NULL`.
    #[must_use]
    pub fn eq(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    /// `column <> value`; comparing with `NULL` renders `IS NOT NULL`.
    #[must_use]
    pub fn ne(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    #[must_use]
    pub fn le(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Le, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    #[must_use]
    pub fn ge(self, value: impl Into<RowValues>) -> Predicate {
        self.compare(CompareOp::Ge, value)
    }

    #[must_use]
    pub fn is_null(self) -> Predicate {
        Predicate::IsNull {
            column: self.name,
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNull {
            column: self.name,
            negated: true,
        }
    }

    /// `column IN (..)`; an empty list matches nothing.
    #[must_use]
    pub fn in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<RowValues>,
    {
        Predicate::InList {
            column: self.name,
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// `column NOT IN (..)`; an empty list matches everything.
    #[must_use]
    pub fn not_in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<RowValues>,
    {
        Predicate::InList {
            column: self.name,
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    #[must_use]
    pub fn like(self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            column: self.name,
            pattern: pattern.into(),
        }
    }
}

impl Predicate {
    /// Conjunction; nested `And`s are flattened.
    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), right) => {
                left.push(right);
                Predicate::And(left)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    /// Disjunction; nested `Or`s are flattened.
    #[must_use]
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), right) => {
                left.push(right);
                Predicate::Or(left)
            }
            (left, right) => Predicate::Or(vec![left, right]),
        }
    }

    /// Conjunction of every predicate; an empty input is always true.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::And(predicates.into_iter().collect())
    }

    /// Disjunction of every predicate; an empty input is always false.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        Predicate::Or(predicates.into_iter().collect())
    }

    fn is_compound(&self) -> bool {
        matches!(self, Predicate::And(v) | Predicate::Or(v) if v.len() > 1)
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        match self {
            Predicate::Compare {
                column,
                op,
                value: RowValues::Null,
            } if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
                writer.push_ident(column);
                writer.push(if *op == CompareOp::Eq {
                    " IS NULL"
                } else {
                    " IS NOT NULL"
                });
            }
            Predicate::Compare { column, op, value } => {
                writer.push_ident(column);
                writer.push(" ");
                writer.push(op.as_sql());
                writer.push(" ");
                writer.push_param(value.clone());
            }
            Predicate::IsNull { column, negated } => {
                writer.push_ident(column);
                writer.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::InList {
                values, negated, ..
            } if values.is_empty() => {
                writer.push(if *negated { "1 = 1" } else { "1 = 0" });
            }
            Predicate::InList {
                column,
                values,
                negated,
            } => {
                writer.push_ident(column);
                writer.push(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        writer.push(", ");
                    }
                    writer.push_param(value.clone());
                }
                writer.push(")");
            }
            Predicate::Like { column, pattern } => {
                writer.push_ident(column);
                writer.push(" LIKE ");
                writer.push_param(RowValues::Text(pattern.clone()));
            }
            Predicate::And(parts) => write_joined(writer, parts, " AND ", "1 = 1"),
            Predicate::Or(parts) => write_joined(writer, parts, " OR ", "1 = 0"),
            Predicate::Not(inner) => {
                writer.push("NOT (");
                inner.write_sql(writer);
                writer.push(")");
            }
            Predicate::Literal(value) => writer.push(if *value { "1 = 1" } else { "1 = 0" }),
        }
    }
}

fn write_joined(writer: &mut SqlWriter, parts: &[Predicate], separator: &str, empty: &str) {
    match parts {
        [] => writer.push(empty),
        [only] => only.write_sql(writer),
        _ => {
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    writer.push(separator);
                }
                if part.is_compound() {
                    writer.push("(");
                    part.write_sql(writer);
                    writer.push(")");
                } else {
                    part.write_sql(writer);
                }
            }
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }
}

impl From<bool> for Predicate {
    fn from(value: bool) -> Self {
        Predicate::Literal(value)
    }
}
