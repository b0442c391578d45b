//! Driver command parsing.

/// One line of driver input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Activate a link with this href.
    Open(String),
    Back,
    Forward,
    /// Print the displayed page, address, title and cache size.
    Show,
    History,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let cmd = match name {
            "open" | "o" if !arg.is_empty() => Self::Open(arg.to_string()),
            "back" | "b" => Self::Back,
            "forward" | "f" => Self::Forward,
            "show" | "s" => Self::Show,
            "history" | "h" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(cmd)
    }
}

pub const HELP: &str = "\
commands:
  open <href>   activate a link
  back          browser back
  forward       browser forward
  show          displayed page, address, title, cache size
  history       traversal stack, most recent first
  quit          exit";
