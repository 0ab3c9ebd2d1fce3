//! Dot-prefixed meta commands.

/// A parsed meta command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// Close the table and stop.
    Exit,
    /// Print the layout constants.
    Constants,
    /// Print the tree shape.
    Btree,
    /// Print pager counters.
    Stats,
    /// Anything else.
    Unrecognized(String),
}

impl MetaCommand {
    /// Parse a line that starts with `.`. Matching is exact.
    pub fn parse(line: &str) -> Self {
        match line {
            ".exit" => MetaCommand::Exit,
            ".constants" => MetaCommand::Constants,
            ".btree" => MetaCommand::Btree,
            ".stats" => MetaCommand::Stats,
            other => MetaCommand::Unrecognized(other.to_string()),
        }
    }
}
