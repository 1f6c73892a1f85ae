//! Chat line → [`ParsedCommand`].
//!
//! Grammar, after the `/<session>` prefix:
//! - nothing → `Empty`
//! - a lone method keyword → `SelectMethod`
//! - `<ipv4>` → `IpOnly`
//! - `<ipv4> <action>` → `DeviceAction`
//! - `<ipv4> banner|motd [text...]` → `BannerAction`
//!
//! Keywords are case-insensitive. Tokens after an action word are ignored.

use nb_protocol::{ActionKind, DeviceAddr, MethodKind, ParseError, ParsedCommand, is_banner_keyword};

/// Parse one chat line. `None` when the line is not addressed to
/// `session_id`; such lines get no reply at all.
pub fn parse(text: &str, session_id: &str) -> Option<ParsedCommand> {
    let rest = strip_prefix(text.trim(), session_id)?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let Some(&first) = tokens.first() else {
        return Some(ParsedCommand::Empty);
    };

    if tokens.len() == 1 {
        if let Some(method) = MethodKind::from_keyword(first) {
            return Some(ParsedCommand::SelectMethod(method));
        }
    }

    let Some(device) = DeviceAddr::parse(first) else {
        return Some(ParsedCommand::Malformed(ParseError::NoIp));
    };

    let Some(&word) = tokens.get(1) else {
        return Some(ParsedCommand::IpOnly(device));
    };

    let command = if let Some(action) = ActionKind::from_keyword(word) {
        ParsedCommand::DeviceAction { device, action }
    } else if is_banner_keyword(word) {
        let text = (tokens.len() > 2).then(|| tokens[2..].join(" "));
        ParsedCommand::BannerAction { device, text }
    } else {
        ParsedCommand::Malformed(ParseError::UnknownCommand(word.to_string()))
    };
    Some(command)
}

/// The text after `/<session_id>`, if the line starts with exactly that
/// word.
fn strip_prefix<'a>(line: &'a str, session_id: &str) -> Option<&'a str> {
    let rest = line.strip_prefix('/')?.strip_prefix(session_id)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID: &str = "66070123";

    fn addr(s: &str) -> DeviceAddr {
        DeviceAddr::parse(s).unwrap()
    }

    #[test]
    fn unaddressed_lines_are_ignored() {
        assert_eq!(parse("hello", SID), None);
        assert_eq!(parse("/66070124 restconf", SID), None);
        assert_eq!(parse("/660701234 restconf", SID), None);
        assert_eq!(parse("66070123 restconf", SID), None);
        assert_eq!(parse("", SID), None);
    }

    #[test]
    fn prefix_only_is_empty() {
        assert_eq!(parse("/66070123", SID), Some(ParsedCommand::Empty));
        assert_eq!(parse("/66070123   ", SID), Some(ParsedCommand::Empty));
    }

    #[test]
    fn method_selection_any_case() {
        assert_eq!(
            parse("/66070123 Restconf", SID),
            Some(ParsedCommand::SelectMethod(MethodKind::Restconf))
        );
        assert_eq!(
            parse("/66070123 NETCONF", SID),
            Some(ParsedCommand::SelectMethod(MethodKind::Netconf))
        );
    }

    #[test]
    fn method_word_with_more_tokens_needs_ip() {
        assert_eq!(
            parse("/66070123 restconf create", SID),
            Some(ParsedCommand::Malformed(ParseError::NoIp))
        );
        assert_eq!(
            parse("/66070123 create", SID),
            Some(ParsedCommand::Malformed(ParseError::NoIp))
        );
    }

    #[test]
    fn ip_only() {
        assert_eq!(
            parse("/66070123 10.0.15.61", SID),
            Some(ParsedCommand::IpOnly(addr("10.0.15.61")))
        );
    }

    #[test]
    fn device_actions() {
        for (word, action) in [
            ("create", ActionKind::Create),
            ("DELETE", ActionKind::Delete),
            ("enable", ActionKind::Enable),
            ("disable", ActionKind::Disable),
            ("status", ActionKind::Status),
            ("bulk_config_fetch", ActionKind::BulkConfigFetch),
            ("showrun", ActionKind::BulkConfigFetch),
            ("gigabit_status", ActionKind::GigabitStatus),
        ] {
            assert_eq!(
                parse(&format!("/66070123 10.0.15.61 {word}"), SID),
                Some(ParsedCommand::DeviceAction {
                    device: addr("10.0.15.61"),
                    action
                }),
                "word {word}"
            );
        }
    }

    #[test]
    fn out_of_range_octets_are_accepted() {
        assert_eq!(
            parse("/66070123 999.999.999.999 status", SID),
            Some(ParsedCommand::DeviceAction {
                device: addr("999.999.999.999"),
                action: ActionKind::Status
            })
        );
    }

    #[test]
    fn banner_read_and_write() {
        assert_eq!(
            parse("/66070123 10.0.15.61 motd", SID),
            Some(ParsedCommand::BannerAction {
                device: addr("10.0.15.61"),
                text: None
            })
        );
        assert_eq!(
            parse("/66070123 10.0.15.61 banner   Authorized  users only!", SID),
            Some(ParsedCommand::BannerAction {
                device: addr("10.0.15.61"),
                text: Some("Authorized users only!".into())
            })
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse("/66070123 10.0.15.61 reboot", SID),
            Some(ParsedCommand::Malformed(ParseError::UnknownCommand(
                "reboot".into()
            )))
        );
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(
            parse("  /66070123 netconf \n", SID),
            Some(ParsedCommand::SelectMethod(MethodKind::Netconf))
        );
    }
}
