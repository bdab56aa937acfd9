use pipeline_stage::Transform;

/// Converts ASCII lowercase letters to uppercase; all other bytes pass
/// through unchanged.
pub struct Upper;

impl Transform for Upper {
    fn name(&self) -> &'static str {
        "upper"
    }

    fn apply(&self, input: String) -> Option<String> {
        // ASCII-only, matching the original: non-ASCII bytes pass through
        // untouched rather than going through Unicode case folding.
        Some(input.chars().map(|c| c.to_ascii_uppercase()).collect())
    }
}
