use crate::settings::ShortcutAction;

/// Everything the presentation layer can ask of the editor.
///
/// Tab indices are 0-based here; the console parser converts from the 1-based
/// numbers it shows to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NewFile,
    Open(String),
    Save,
    SaveAs(String),
    Close(Option<usize>),
    SwitchTo(usize),
    NextTab,
    PrevTab,
    AppendLine(String),
    SetCursor(usize),
    ListTabs,
    SetFontSize(u32),
    SetTheme(String),
    SetShortcut(ShortcutAction, String),
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Not a valid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown shortcut action: {0}")]
    UnknownAction(String),
}

/// Parse one console line such as `open notes.txt` or `close 2`.
pub fn parse_command_line(line: &str) -> Result<Command, CommandParseError> {
    let trimmed = line.trim();
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    match name {
        "" => Err(CommandParseError::Empty),
        "q" | "quit" => Ok(Command::Quit),
        "n" | "new" => Ok(Command::NewFile),
        "e" | "edit" | "open" => required(rest, "path").map(|p| Command::Open(p.to_string())),
        "w" | "write" | "save" if rest.is_empty() => Ok(Command::Save),
        "w" | "write" | "save" | "saveas" => {
            required(rest, "path").map(|p| Command::SaveAs(p.to_string()))
        }
        "close" | "bd" => {
            if rest.is_empty() {
                Ok(Command::Close(None))
            } else {
                tab_number(rest).map(|i| Command::Close(Some(i)))
            }
        }
        "tab" | "switch" | "b" => tab_number(required(rest, "tab number")?).map(Command::SwitchTo),
        "next" | "bn" => Ok(Command::NextTab),
        "prev" | "bp" => Ok(Command::PrevTab),
        "append" | "a" => Ok(Command::AppendLine(rest.to_string())),
        "cursor" => number(required(rest, "position")?).map(Command::SetCursor),
        "ls" | "list" | "tabs" => Ok(Command::ListTabs),
        "font" => {
            let size = required(rest, "font size")?;
            size.parse::<u32>()
                .map(Command::SetFontSize)
                .map_err(|_| CommandParseError::InvalidNumber(size.to_string()))
        }
        "theme" => required(rest, "theme name").map(|t| Command::SetTheme(t.to_string())),
        "shortcut" => {
            let (action, seq) = required(rest, "action")?
                .split_once(char::is_whitespace)
                .ok_or(CommandParseError::MissingArgument("key sequence"))?;
            let action = ShortcutAction::from_name(action)
                .ok_or_else(|| CommandParseError::UnknownAction(action.to_string()))?;
            Ok(Command::SetShortcut(action, seq.trim().to_string()))
        }
        other => Err(CommandParseError::Unknown(other.to_string())),
    }
}

fn required<'a>(rest: &'a str, what: &'static str) -> Result<&'a str, CommandParseError> {
    if rest.is_empty() {
        Err(CommandParseError::MissingArgument(what))
    } else {
        Ok(rest)
    }
}

fn number(arg: &str) -> Result<usize, CommandParseError> {
    arg.parse::<usize>()
        .map_err(|_| CommandParseError::InvalidNumber(arg.to_string()))
}

fn tab_number(arg: &str) -> Result<usize, CommandParseError> {
    match number(arg)? {
        0 => Err(CommandParseError::InvalidNumber(arg.to_string())),
        n => Ok(n - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command_line("q"), Ok(Command::Quit));
        assert_eq!(parse_command_line("  new "), Ok(Command::NewFile));
        assert_eq!(parse_command_line("w"), Ok(Command::Save));
        assert_eq!(parse_command_line("ls"), Ok(Command::ListTabs));
        assert_eq!(parse_command_line("next"), Ok(Command::NextTab));
    }

    #[test]
    fn test_parse_paths_keep_spaces() {
        assert_eq!(
            parse_command_line("open my notes.txt"),
            Ok(Command::Open("my notes.txt".to_string()))
        );
        assert_eq!(
            parse_command_line("w out.txt"),
            Ok(Command::SaveAs("out.txt".to_string()))
        );
        assert_eq!(
            parse_command_line("open"),
            Err(CommandParseError::MissingArgument("path"))
        );
    }

    #[test]
    fn test_tab_numbers_are_one_based() {
        assert_eq!(parse_command_line("tab 1"), Ok(Command::SwitchTo(0)));
        assert_eq!(parse_command_line("close 3"), Ok(Command::Close(Some(2))));
        assert_eq!(parse_command_line("close"), Ok(Command::Close(None)));
        assert!(matches!(
            parse_command_line("tab 0"),
            Err(CommandParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_command_line("tab two"),
            Err(CommandParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_settings_commands() {
        assert_eq!(parse_command_line("font 14"), Ok(Command::SetFontSize(14)));
        assert_eq!(
            parse_command_line("theme Purple"),
            Ok(Command::SetTheme("Purple".to_string()))
        );
        assert_eq!(
            parse_command_line("shortcut saveAs ctrl + shift + s"),
            Ok(Command::SetShortcut(
                ShortcutAction::SaveAs,
                "ctrl + shift + s".to_string()
            ))
        );
        assert!(matches!(
            parse_command_line("shortcut quit ctrl+q"),
            Err(CommandParseError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse_command_line(""), Err(CommandParseError::Empty));
        assert_eq!(
            parse_command_line("frobnicate"),
            Err(CommandParseError::Unknown("frobnicate".to_string()))
        );
    }
}
