//! Chat command parsing.

/// A chat line recognised as a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ultimate,
    /// Open the main menu
    Menu,
    /// Open the admin menu
    Admin,
    Unknown(String),
}

/// Parse a chat line.
///
/// Returns None if the line doesn't start with `prefix`.
pub fn parse(prefix: &str, text: &str) -> Option<ChatCommand> {
    let rest = text.trim().strip_prefix(prefix)?;
    let command = rest.split_whitespace().next()?.to_lowercase();

    Some(match command.as_str() {
        "ultimate" => ChatCommand::Ultimate,
        "hw" | "menu" => ChatCommand::Menu,
        "admin" => ChatCommand::Admin,
        _ => ChatCommand::Unknown(command),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(parse("!", "!ultimate"), Some(ChatCommand::Ultimate));
        assert_eq!(parse("!", "  !HW  "), Some(ChatCommand::Menu));
        assert_eq!(parse("!", "!admin now"), Some(ChatCommand::Admin));
    }

    #[test]
    fn test_parse_ignores_plain_chat() {
        assert_eq!(parse("!", "gg wp"), None);
        assert_eq!(parse("!", "!"), None);
    }

    #[test]
    fn test_parse_unknown_and_custom_prefix() {
        assert_eq!(parse("/", "/dance"), Some(ChatCommand::Unknown("dance".into())));
        assert_eq!(parse("/", "!hw"), None);
    }
}
