use std::sync::Arc;

use pipeline_stage::Transform;

use crate::expand::Expand;
use crate::logger::Logger;
use crate::reverse::Reverse;
use crate::rotate::Rotate1;
use crate::typewriter::Typewriter;
use crate::upper::Upper;

/// Resolves a stage name from the command line to a transform instance.
///
/// Both the placeholder names used by this pipeline (`upper`, `reverse`,
/// `rotate1`, `space-expand`, `log`) and the original plugin directory names
/// (`uppercaser`, `flipper`, `rotator`, `expander`, `logger`, `typewriter`)
/// are accepted as aliases for the same transform, since dynamic module
/// loading is out of scope and every transform this pipeline can run is
/// known statically.
pub fn resolve(name: &str) -> Option<Arc<dyn Transform>> {
    match name {
        "upper" | "uppercaser" => Some(Arc::new(Upper)),
        "reverse" | "flipper" => Some(Arc::new(Reverse)),
        "rotate1" | "rotator" => Some(Arc::new(Rotate1)),
        "space-expand" | "expander" => Some(Arc::new(Expand)),
        "log" | "logger" => Some(Arc::new(Logger::new())),
        "typewriter" => Some(Arc::new(Typewriter::new())),
        _ => None,
    }
}

/// The canonical names accepted by [`resolve`], in the order they are listed
/// in usage output. Aliases are omitted; each transform appears once under
/// its placeholder name.
pub const KNOWN_TRANSFORMS: &[&str] = &["upper", "reverse", "rotate1", "space-expand", "log", "typewriter"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_known_transform() {
        for name in KNOWN_TRANSFORMS {
            assert!(resolve(name).is_some(), "expected {name} to resolve");
        }
    }

    #[test]
    fn resolves_original_plugin_name_aliases() {
        let aliases = [
            "uppercaser",
            "flipper",
            "rotator",
            "expander",
            "logger",
        ];
        for name in aliases {
            assert!(resolve(name).is_some(), "expected alias {name} to resolve");
        }
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(resolve("not-a-real-transform").is_none());
    }
}
