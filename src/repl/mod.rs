//! Line-oriented front end over a [`Table`].
//!
//! # Components
//! - [`Session`] - Runs one input line at a time against an open table
//! - [`prepare_statement`] - Parses `insert` / `select`
//! - [`MetaCommand`] - `.exit`, `.constants`, `.btree`, `.stats`
//! - [`run`] - Prompt/read/execute loop over any reader and writer
//!
//! A session writes exactly what a user sees to the supplied writer, so
//! transcripts can be checked without a terminal.

mod meta;
mod statement;

pub use meta::MetaCommand;
pub use statement::{prepare_statement, PrepareError, Statement};

use std::io::{BufRead, Write};

use tracing::{error, warn};

use crate::common::{Error, Result};
use crate::index::btree::printer;
use crate::table::{ExecuteResult, Table};

/// What the caller should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// How [`run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `.exit` was entered.
    Exit,
    /// Input ran out before `.exit`.
    EndOfInput,
}

/// Prompt, read, and execute lines from `input` until `.exit` or end of
/// input, then close the table.
///
/// The table is closed on every path, including when a statement fails
/// with a structural error, so rows inserted earlier in the session reach
/// the file.
pub fn run(mut session: Session, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<Outcome> {
    let result = drive(&mut session, input, out);
    let closed = session.close();
    match result {
        Ok(outcome) => closed.map(|_| outcome),
        Err(e) => {
            if let Err(close_err) = closed {
                error!(error = %close_err, "close after failed statement also failed");
            }
            Err(e)
        }
    }
}

fn drive(session: &mut Session, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<Outcome> {
    let mut line = String::new();
    loop {
        write!(out, "\ndb > ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "Error reading input")?;
            return Ok(Outcome::EndOfInput);
        }

        let command = line.trim_end_matches(['\n', '\r']);
        if session.run_line(command, out)? == Control::Exit {
            return Ok(Outcome::Exit);
        }
    }
}

/// An interactive session bound to one table.
pub struct Session {
    table: Table,
}

impl Session {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Run one input line (without its trailing newline).
    ///
    /// User mistakes and full tables are reported on `out` and the session
    /// continues. Structural and I/O errors are returned.
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Control> {
        if line.starts_with('.') {
            return self.run_meta(MetaCommand::parse(line), out);
        }

        let statement = match prepare_statement(line) {
            Ok(statement) => statement,
            Err(e) => {
                writeln!(out, "{}", e)?;
                return Ok(Control::Continue);
            }
        };

        match statement {
            Statement::Insert(row) => match self.table.insert(&row) {
                Ok(ExecuteResult::Success) => writeln!(out, "Executed.")?,
                Ok(ExecuteResult::DuplicateKey) => writeln!(out, "Error: Duplicate key.")?,
                Err(Error::CapacityExceeded { max_cells }) => {
                    warn!(max_cells, id = row.id, "insert rejected, leaf full");
                    writeln!(out, "Error: Table full.")?;
                }
                Err(e) => return Err(e),
            },
            Statement::Select => {
                let mut cursor = self.table.start()?;
                while !cursor.is_end() {
                    writeln!(out, "{}", cursor.row()?)?;
                    cursor.advance()?;
                }
                writeln!(out, "Executed.")?;
            }
        }
        Ok(Control::Continue)
    }

    fn run_meta(&mut self, command: MetaCommand, out: &mut dyn Write) -> Result<Control> {
        match command {
            MetaCommand::Exit => return Ok(Control::Exit),
            MetaCommand::Constants => {
                writeln!(out, "Constants: ")?;
                for (name, value) in printer::layout_constants() {
                    writeln!(out, "{}: {}", name, value)?;
                }
            }
            MetaCommand::Btree => {
                writeln!(out, "Tree:")?;
                write!(out, "{}", self.table.render_tree()?)?;
            }
            MetaCommand::Stats => {
                writeln!(out, "{}", self.table.pager().stats())?;
            }
            MetaCommand::Unrecognized(line) => {
                writeln!(out, "Unrecognized Command: '{}'", line)?;
            }
        }
        Ok(Control::Continue)
    }

    /// Close the underlying table.
    pub fn close(self) -> Result<()> {
        self.table.close()
    }
}
