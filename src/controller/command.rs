use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Not a command: {0}")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid number: {0}")]
    BadNumber(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    LineNumbers(bool),
    AutoSave(bool),
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/query`; a bare `/` clears the filter
    Search(String),
    Insert { offset: usize, text: String },
    Remove { offset: usize, length: usize },
    Undo,
    Redo,
    PrintVisible,
    PrintRaw,
    Write(Option<PathBuf>),
    Edit { path: PathBuf, force: bool },
    New { force: bool },
    Recent,
    Set(Setting),
    Quit { force: bool },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if let Some(query) = line.strip_prefix('/') {
            return Ok(Command::Search(query.to_string()));
        }

        let line = line.trim_start();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (line, ""),
        };
        // Only inserted text keeps its trailing whitespace
        let args = rest.trim_end();

        match name {
            "i" => {
                let (offset, text) = rest
                    .split_once(' ')
                    .ok_or(CommandError::MissingArgument("text to insert"))?;
                Ok(Command::Insert {
                    offset: parse_number(offset)?,
                    text: unescape(text),
                })
            }
            "x" => {
                let mut numbers = args.split_whitespace();
                let offset = numbers.next().ok_or(CommandError::MissingArgument("offset"))?;
                let length = numbers.next().ok_or(CommandError::MissingArgument("length"))?;
                Ok(Command::Remove {
                    offset: parse_number(offset)?,
                    length: parse_number(length)?,
                })
            }
            "u" => Ok(Command::Undo),
            "r" => Ok(Command::Redo),
            "p" => Ok(Command::PrintVisible),
            "P" => Ok(Command::PrintRaw),
            "w" => Ok(Command::Write(
                (!args.is_empty()).then(|| PathBuf::from(args)),
            )),
            "e" | "e!" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument("file name"));
                }
                Ok(Command::Edit {
                    path: PathBuf::from(args),
                    force: name == "e!",
                })
            }
            "n" => Ok(Command::New { force: false }),
            "n!" => Ok(Command::New { force: true }),
            "recent" => Ok(Command::Recent),
            "set" => parse_setting(args).map(Command::Set),
            "q" => Ok(Command::Quit { force: false }),
            "q!" => Ok(Command::Quit { force: true }),
            _ => Err(CommandError::Unknown(line.trim_end().to_string())),
        }
    }
}

fn parse_number(arg: &str) -> Result<usize, CommandError> {
    arg.trim()
        .parse()
        .map_err(|_| CommandError::BadNumber(arg.to_string()))
}

fn parse_setting(option: &str) -> Result<Setting, CommandError> {
    match option {
        "nu" | "number" => Ok(Setting::LineNumbers(true)),
        "nonu" | "nonumber" => Ok(Setting::LineNumbers(false)),
        "autosave" => Ok(Setting::AutoSave(true)),
        "noautosave" => Ok(Setting::AutoSave(false)),
        "" => Err(CommandError::MissingArgument("option")),
        _ => Err(CommandError::UnknownOption(option.to_string())),
    }
}

/// Expands `\n`, `\t` and `\\`; any other backslash is kept as is.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}
