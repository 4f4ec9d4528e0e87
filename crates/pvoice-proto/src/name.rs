//! Channel naming rules.

use crate::error::{ProtocolError, Result};

/// Maximum channel name length accepted by the platform, in characters.
pub const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Build `<prefix><title>`, rejecting names over [`MAX_CHANNEL_NAME_LEN`].
pub fn compose_channel_name(prefix: &str, title: &str) -> Result<String> {
    let len = prefix.chars().count() + title.chars().count();
    if len > MAX_CHANNEL_NAME_LEN {
        return Err(ProtocolError::NameTooLong {
            len,
            limit: MAX_CHANNEL_NAME_LEN,
        });
    }
    Ok(format!("{prefix}{title}"))
}

/// Whether `name` looks like a channel this daemon created.
///
/// The name must carry the prefix and something after it; a channel named
/// exactly the prefix is not ours.
pub fn has_voice_prefix(name: &str, prefix: &str) -> bool {
    name.len() > prefix.len() && name.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_at_limit() {
        let title = "x".repeat(94);
        let name = compose_channel_name("PVoC: ", &title).unwrap();
        assert_eq!(name.chars().count(), 100);
    }

    #[test]
    fn test_compose_over_limit() {
        let title = "x".repeat(95);
        assert_eq!(
            compose_channel_name("PVoC: ", &title),
            Err(ProtocolError::NameTooLong { len: 101, limit: 100 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let title = "é".repeat(96);
        assert!(compose_channel_name("PV: ", &title).is_ok());
    }

    #[test]
    fn test_has_voice_prefix() {
        assert!(has_voice_prefix("PV: Game Night", "PV: "));
        assert!(!has_voice_prefix("PV: ", "PV: "));
        assert!(!has_voice_prefix("General", "PV: "));
        assert!(!has_voice_prefix("pv: lower", "PV: "));
    }
}
