use clap::{Parser, Subcommand};

/// Jobs and companies API server
#[derive(Debug, Parser)]
#[command(name = "jobly", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Apply migrations and start the HTTP server (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["jobly"]);
        assert_eq!(cli.command(), &Command::Serve);
    }

    #[test]
    fn migrate_subcommand() {
        let cli = Cli::parse_from(["jobly", "migrate"]);
        assert_eq!(cli.command(), &Command::Migrate);
    }
}
