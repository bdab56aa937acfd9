/// The distinguished payload that triggers orderly pipeline shutdown.
///
/// Never reaches a [`Transform`](crate::Transform) impl — the worker loop
/// intercepts it before invoking the stage's transform.
pub const SENTINEL: &str = "<END>";

/// Returns `true` iff `s` is exactly the sentinel.
#[inline]
pub fn is_sentinel(s: &str) -> bool {
    s == SENTINEL
}

/// A pure per-item transform: string in, string-or-rejection out.
///
/// Ownership is explicit rather than the "same pointer, new buffer, or null"
/// trichotomy of the C original: `apply` always consumes its input and
/// either returns an owned `String` (built by moving, mutating, or copying
/// the input — the implementor's choice) or `None` to reject the item. The
/// stage runtime frees exactly one buffer per item because there is exactly
/// one `String` in play at any time; there is nothing to double-free.
pub trait Transform: Send + Sync {
    /// A short, stable name used for diagnostics and CLI resolution.
    fn name(&self) -> &'static str;

    /// Applies the transform to `input`, returning `None` to drop the item.
    fn apply(&self, input: String) -> Option<String>;
}
