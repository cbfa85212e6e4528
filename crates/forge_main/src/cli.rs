//! NOTE: Always use singular names for commands and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "Render streamed markdown to HTML")]
pub struct Cli {
    /// Path to a TOML file with renderer settings.
    ///
    /// Values can also be overridden with `FORGE_MD__<KEY>` environment
    /// variables, e.g. `FORGE_MD__TRAILING_WINDOW=1024`.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(long, default_value_t = false, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a whole markdown document to sanitized HTML.
    Render {
        /// Markdown file to read. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,
    },

    /// Replay a document as a token stream and print the HTML rebuilt from
    /// its deltas.
    Stream {
        /// Markdown file to read. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,

        /// Number of characters per simulated chunk.
        #[arg(long, default_value_t = 16)]
        chunk_size: usize,

        /// Print one JSON object per chunk instead of the rebuilt HTML.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Split reasoning segments, delimited by the configured tag, from the
    /// visible text.
    Think {
        /// Text file to read. Reads stdin when omitted or `-`.
        file: Option<PathBuf>,
    },
}

impl Command {
    pub fn file(&self) -> Option<&PathBuf> {
        match self {
            Self::Render { file } | Self::Stream { file, .. } | Self::Think { file } => {
                file.as_ref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_stream_defaults() {
        let fixture = Cli::parse_from(["forge-md", "stream", "notes.md"]);
        let actual = fixture.command;
        assert!(matches!(
            actual,
            Command::Stream { chunk_size: 16, json: false, .. }
        ));
        assert_eq!(actual.file(), Some(&PathBuf::from("notes.md")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let fixture = Cli::parse_from(["forge-md", "render", "--verbose", "--config", "md.toml"]);
        assert!(fixture.verbose);
        assert_eq!(fixture.config, Some(PathBuf::from("md.toml")));
        assert_eq!(fixture.command.file(), None);
    }

    #[test]
    fn test_stream_options() {
        let fixture = Cli::parse_from(["forge-md", "stream", "--chunk-size", "4", "--json"]);
        assert!(matches!(fixture.command, Command::Stream { chunk_size: 4, json: true, file: None }));
    }
}
