//! Command line parsing.

use super::types::{CommandKind, CommandRef};
use crate::error::{ProtocolError, Result};
use nom::bytes::complete::take_till1;
use nom::character::complete::{char as prefix_char, multispace0};
use nom::sequence::preceded;
use nom::IResult;

/// `<name>` followed by optional whitespace; the remainder is left unparsed.
fn command_name(input: &str) -> IResult<&str, &str> {
    let (input, name) = take_till1(|c: char| c.is_whitespace())(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, name))
}

/// Parse a chat message into a command.
///
/// Returns an error for anything that is not addressed to the daemon; the
/// caller is expected to ignore those messages silently.
pub fn parse_command(prefix: char, input: &str) -> Result<CommandRef<'_>> {
    if input.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if !input.starts_with(prefix) {
        return Err(ProtocolError::MissingPrefix(prefix));
    }

    let (rest, name) = preceded(prefix_char(prefix), command_name)(input)
        .map_err(|_| ProtocolError::MissingCommand)?;
    let kind: CommandKind = name.parse()?;

    Ok(CommandRef {
        kind,
        name,
        rest: rest.trim_end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_new_with_title() {
        let cmd = parse_command('!', "!new Game Night").unwrap();
        assert_eq!(cmd.kind, CommandKind::New);
        assert_eq!(cmd.name, "new");
        assert_eq!(cmd.title(), Some("Game Night"));
    }

    #[test]
    fn test_parse_new_without_title() {
        let cmd = parse_command('!', "!new").unwrap();
        assert_eq!(cmd.title(), None);

        let cmd = parse_command('!', "!new    ").unwrap();
        assert_eq!(cmd.title(), None);
    }

    #[test]
    fn test_title_keeps_inner_spacing() {
        let cmd = parse_command('!', "!new  a   b ").unwrap();
        assert_eq!(cmd.title(), Some("a   b"));
    }

    #[test]
    fn test_command_name_is_case_insensitive() {
        let cmd = parse_command('!', "!KiCk <@1>").unwrap();
        assert_eq!(cmd.kind, CommandKind::Kick);
        assert_eq!(cmd.name, "KiCk");
        assert_eq!(cmd.rest, "<@1>");
    }

    #[test]
    fn test_allow_is_distinct_from_invite() {
        assert_eq!(parse_command('!', "!allow").unwrap().kind, CommandKind::Allow);
        assert_eq!(parse_command('!', "!invite").unwrap().kind, CommandKind::Invite);
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(parse_command('$', "$op <@7>").unwrap().kind, CommandKind::Op);
        assert_eq!(
            parse_command('$', "!op <@7>"),
            Err(ProtocolError::MissingPrefix('$'))
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_command('!', ""), Err(ProtocolError::Empty));
        assert_eq!(parse_command('!', "hello"), Err(ProtocolError::MissingPrefix('!')));
        assert_eq!(parse_command('!', "!"), Err(ProtocolError::MissingCommand));
        assert_eq!(parse_command('!', "! new"), Err(ProtocolError::MissingCommand));
        assert_eq!(
            parse_command('!', "!play despacito"),
            Err(ProtocolError::UnknownCommand("play".to_owned()))
        );
    }

    #[test]
    fn test_requires_mentions() {
        assert!(CommandKind::Kick.requires_mentions());
        assert!(CommandKind::Allow.requires_mentions());
        assert!(!CommandKind::New.requires_mentions());
        assert!(!CommandKind::Delete.requires_mentions());
        assert!(!CommandKind::Leave.requires_mentions());
    }

    proptest! {
        #[test]
        fn parse_never_panics(s in "\\PC*") {
            let _ = parse_command('!', &s);
        }

        #[test]
        fn recognized_commands_round_trip(idx in 0usize..8, title in "[a-zA-Z0-9 ]{0,40}") {
            let kind = CommandKind::ALL[idx];
            let line = format!("!{} {}", kind.as_str().to_uppercase(), title);
            let cmd = parse_command('!', &line).unwrap();
            prop_assert_eq!(cmd.kind, kind);
            prop_assert_eq!(cmd.rest, title.trim());
        }
    }
}
