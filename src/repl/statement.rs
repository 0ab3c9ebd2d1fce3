//! Statement parsing.
//!
//! Two statements exist: `insert <id> <username> <email>` and `select`.

use thiserror::Error;

use crate::common::Error;
use crate::record::Row;

/// A parsed statement, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// Why a line could not be turned into a [`Statement`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("String is too long")]
    StringTooLong,

    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),
}

/// Parse one input line.
///
/// The keyword is matched as a prefix, so `selectx` still selects.
/// Insert takes exactly three whitespace-separated fields after the
/// keyword; extra fields are ignored.
///
/// # Example
/// ```
/// use stratadb::repl::{prepare_statement, PrepareError, Statement};
///
/// assert_eq!(prepare_statement("select"), Ok(Statement::Select));
/// assert_eq!(prepare_statement("insert -1 a b"), Err(PrepareError::NegativeId));
/// ```
pub fn prepare_statement(line: &str) -> Result<Statement, PrepareError> {
    if line.starts_with("insert") {
        return prepare_insert(line);
    }
    if line.starts_with("select") {
        return Ok(Statement::Select);
    }
    Err(PrepareError::UnrecognizedStatement(line.to_string()))
}

fn prepare_insert(line: &str) -> Result<Statement, PrepareError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("insert") {
        return Err(PrepareError::SyntaxError);
    }

    let (id, username, email) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(id), Some(username), Some(email)) => (id, username, email),
        _ => return Err(PrepareError::SyntaxError),
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    match Row::new(id, username, email) {
        Ok(row) => Ok(Statement::Insert(row)),
        Err(Error::StringTooLong { .. }) => Err(PrepareError::StringTooLong),
        Err(_) => Err(PrepareError::SyntaxError),
    }
}
