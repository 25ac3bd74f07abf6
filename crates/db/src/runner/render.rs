//! Rendering statements into SQL script text.

use std::fmt;

use sea_orm::{DbBackend, Statement};

/// Placeholder style used when bound values are not inlined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamStyle {
    /// `:p1, :p2, ...`
    #[default]
    Named,
    /// Whatever the dialect emits (`$1` for PostgreSQL, `?` otherwise).
    Positional,
}

impl fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named => f.write_str("named"),
            Self::Positional => f.write_str("positional"),
        }
    }
}

/// Renders one statement as script text, terminated with `;`.
#[must_use]
pub fn render_statement(stmt: &Statement, literal_binds: bool, param_style: ParamStyle) -> String {
    let sql = if literal_binds {
        stmt.to_string()
    } else {
        match param_style {
            ParamStyle::Named => to_named_params(&stmt.sql, stmt.db_backend),
            ParamStyle::Positional => stmt.sql.clone(),
        }
    };
    format!("{};\n\n", sql.trim_end())
}

/// Rewrites dialect placeholders to `:pN`, leaving quoted text alone.
fn to_named_params(sql: &str, backend: DbBackend) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    let mut counter = 0_usize;

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            out.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '$' if backend == DbBackend::Postgres
                && chars.peek().is_some_and(char::is_ascii_digit) =>
            {
                out.push_str(":p");
                while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                    out.push(digit);
                }
            }
            '?' if backend != DbBackend::Postgres => {
                counter += 1;
                out.push_str(":p");
                out.push_str(&counter.to_string());
            }
            _ => out.push(c),
        }
    }

    out
}
