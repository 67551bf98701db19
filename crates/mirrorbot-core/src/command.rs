//! Chat command parsing.
//!
//! State-free router over trimmed message text: the first
//! whitespace-delimited token selects the command.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/mirror <source URL> [dest owner/repo]`
    Mirror {
        source: Option<String>,
        dest: Option<String>,
    },
    /// `/getid`
    GetId,
    /// `/login <GitHub token>` -- a missing token is a usage error handled
    /// by the login flow, not a parse failure.
    Login { token: Option<String> },
    /// `/logout`
    Logout,
    /// Anything unrecognized, including empty input.
    Help,
}

impl Command {
    /// Parse a raw message text into a command.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        match parts.next() {
            Some("/mirror") => Command::Mirror {
                source: parts.next().map(str::to_string),
                dest: parts.next().map(str::to_string),
            },
            Some("/getid") => Command::GetId,
            Some("/login") => Command::Login {
                token: parts.next().map(str::to_string),
            },
            Some("/logout") => Command::Logout,
            _ => Command::Help,
        }
    }
}
