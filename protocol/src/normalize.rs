//! Name normalization shared by the encoder, the action history and rosters

/// Lowercase and strip spaces and hyphens: "Will-O-Wisp" -> "willowisp".
///
/// Event lines and request JSON spell names differently, so every comparison
/// between the two goes through this.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Showdown's `toID`: lowercase ASCII alphanumerics only
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
