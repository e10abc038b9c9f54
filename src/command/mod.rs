//! The dashboard's command palette: one line of text in, one status message out.

mod history;
mod palette;
mod parser;

pub use history::History;
pub use palette::{CommandPalette, CommandResult, HELP};
pub use parser::{parse, Command, DeleteTarget, ParseError};
