//! Conditional clause composition for filtered reads.
//!
//! Only `&'static str` fragments reach the SQL text; every caller-supplied
//! value travels as a bound parameter.

use rusqlite::ToSql;

#[derive(Default)]
pub(crate) struct Conditions {
    clauses: Vec<&'static str>,
    params: Vec<Box<dyn ToSql>>,
}

impl Conditions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A condition without parameters
    pub(crate) fn always(&mut self, clause: &'static str) -> &mut Self {
        self.clauses.push(clause);
        self
    }

    /// A condition with one `?` placeholder bound to `value`
    pub(crate) fn bind<V: ToSql + 'static>(&mut self, clause: &'static str, value: V) -> &mut Self {
        self.clauses.push(clause);
        self.params.push(Box::new(value));
        self
    }

    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Append trailing parameters, e.g. LIMIT/OFFSET, after the WHERE values
    pub(crate) fn push_param<V: ToSql + 'static>(&mut self, value: V) {
        self.params.push(Box::new(value));
    }

    pub(crate) fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// `LIKE` operand matching `keyword` as a literal substring (escape char `\`)
pub(crate) fn like_substring(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
