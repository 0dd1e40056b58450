// Shared prompt constants.
// Section labels of the assembled prompt live in matching/prompts.rs.

/// System instruction sent with every matching prompt.
pub const MATCHING_SYSTEM: &str = "あなたは案件をマッチングするエージェントです。";
