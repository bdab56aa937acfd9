use pipeline_stage::Transform;

/// Right-rotates the item by one character: the last character moves to the
/// front and every other character shifts right by one. Empty and
/// single-character strings are a no-op.
pub struct Rotate1;

impl Transform for Rotate1 {
    fn name(&self) -> &'static str {
        "rotate1"
    }

    fn apply(&self, input: String) -> Option<String> {
        let chars: Vec<char> = input.chars().collect();
        if chars.len() <= 1 {
            return Some(input);
        }
        let mut out = String::with_capacity(input.len());
        out.push(chars[chars.len() - 1]);
        out.extend(&chars[..chars.len() - 1]);
        Some(out)
    }
}
