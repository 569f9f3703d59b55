//! Text presentation helpers shared by reports and the CLI.

pub mod formatting;
