use clap::Parser;

/// Command-line surface for the pipeline driver.
///
/// Two invocation grammars are accepted side by side:
///
/// - named flags: `pipeline-cli --capacity 8 upper rotate1 log`
/// - bare positional (the original invocation grammar): `pipeline-cli 8 upper rotate1 log`
///
/// so that `--capacity`/`-c` is documented as primary but the historical
/// positional form keeps working unchanged.
#[derive(Parser, Debug)]
#[command(name = "pipeline-cli", version, about = "Run a chain of string transforms over stdin")]
pub struct Cli {
    /// Per-stage queue capacity. May also be given as the first positional
    /// argument instead.
    #[arg(short = 'c', long = "capacity")]
    capacity: Option<usize>,

    /// Stage names, in pipeline order. If `--capacity` was not given, the
    /// first entry here is consumed as the capacity instead.
    #[arg(num_args = 1.., trailing_var_arg = true)]
    rest: Vec<String>,
}

/// A fully parsed and validated invocation: capacity plus an ordered,
/// non-empty list of trimmed stage names.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub capacity: usize,
    pub stages: Vec<String>,
}

impl Cli {
    /// Resolves either grammar into a validated [`Invocation`].
    ///
    /// Mirrors the original CLI's validation rules: the capacity must parse
    /// as a positive integer (whitespace around it is tolerated), and no
    /// stage name may be empty or carry a trailing `.so`-style extension.
    pub fn into_invocation(self) -> Result<Invocation, String> {
        let (capacity, names) = match self.capacity {
            Some(capacity) => (capacity, self.rest),
            None => {
                let mut rest = self.rest.into_iter();
                let raw_capacity = rest.next().ok_or_else(|| "missing queue_size".to_string())?;
                let capacity = parse_capacity(&raw_capacity)?;
                (capacity, rest.collect())
            }
        };

        let stages = collect_stage_names(names)?;
        Ok(Invocation { capacity, stages })
    }
}

/// Parses a positive integer capacity, tolerating surrounding whitespace and
/// rejecting empty, non-numeric, negative, zero, or out-of-range input.
pub fn parse_capacity(raw: &str) -> Result<usize, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("missing queue_size".to_string());
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| format!("invalid queue_size: {trimmed:?}"))?;
    if value <= 0 {
        return Err("queue_size must be a positive integer".to_string());
    }
    usize::try_from(value).map_err(|_| "queue_size out of range".to_string())
}

fn collect_stage_names(raw: Vec<String>) -> Result<Vec<String>, String> {
    if raw.is_empty() {
        return Err("missing plugin names".to_string());
    }
    raw.into_iter()
        .map(|name| {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err("invalid plugin name: empty".to_string());
            }
            if trimmed.ends_with(".so") {
                return Err(format!("invalid plugin name: {trimmed:?} should not include .so"));
            }
            Ok(trimmed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["pipeline-cli"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("args should parse")
    }

    #[test]
    fn named_flag_form() {
        let inv = cli(&["--capacity", "8", "upper", "log"]).into_invocation().unwrap();
        assert_eq!(inv.capacity, 8);
        assert_eq!(inv.stages, vec!["upper", "log"]);
    }

    #[test]
    fn bare_positional_form() {
        let inv = cli(&["8", "upper", "log"]).into_invocation().unwrap();
        assert_eq!(inv.capacity, 8);
        assert_eq!(inv.stages, vec!["upper", "log"]);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = cli(&["0", "log"]).into_invocation().unwrap_err();
        assert!(err.contains("positive"));
    }

    #[test]
    fn rejects_non_numeric_capacity() {
        let err = cli(&["abc", "log"]).into_invocation().unwrap_err();
        assert!(err.contains("invalid queue_size"));
    }

    #[test]
    fn rejects_missing_stage_names() {
        let err = cli(&["8"]).into_invocation().unwrap_err();
        assert!(err.contains("missing plugin names"));
    }

    #[test]
    fn rejects_dot_so_suffixed_name() {
        let err = cli(&["8", "upper.so"]).into_invocation().unwrap_err();
        assert!(err.contains(".so"));
    }

    #[test]
    fn trims_whitespace_around_capacity() {
        // Whitespace tolerance is a `parse_capacity` behavior, reached only
        // via the bare positional form; the named `--capacity` flag is
        // parsed by clap itself (`usize::from_str`), which does not trim.
        let inv = cli(&[" 8 ", "log"]).into_invocation().unwrap();
        assert_eq!(inv.capacity, 8);
    }
}
