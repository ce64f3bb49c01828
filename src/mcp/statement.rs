/// Keywords that reject an `execute` statement wherever they appear,
/// including inside comments, literals and longer identifiers.
pub const BLOCKED_KEYWORDS: [&str; 4] = ["delete", "drop", "update", "insert"];

/// First blocked keyword found in the statement, case-insensitively
pub fn blocked_keyword(statement: &str) -> Option<&'static str> {
    let lowered = statement.to_lowercase();
    BLOCKED_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
}
