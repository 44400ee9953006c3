use std::fmt;

/// Errors raised while compiling folder patterns or expanding layouts.
///
/// Data-quality problems (absent statistics, NaN results, missing extra
/// columns) are never errors; they become `Cell::Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Malformed user configuration, e.g. an unterminated `{` block
    Configuration(String),
    /// Token list or table rows violate the schema/value invariant
    SchemaMismatch(String),
}

impl LayoutError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        LayoutError::Configuration(msg.into())
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        LayoutError::SchemaMismatch(msg.into())
    }

    fn hint(&self) -> &'static str {
        match self {
            LayoutError::Configuration(_) => {
                "check the folder pattern and statistic names in your layout configuration"
            }
            LayoutError::SchemaMismatch(_) => {
                "every group start marker needs a matching end marker of the same kind"
            }
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let use_color = should_use_color();

        let (kind, msg) = match self {
            LayoutError::Configuration(msg) => ("configuration error", msg),
            LayoutError::SchemaMismatch(msg) => ("schema mismatch", msg),
        };

        if use_color {
            writeln!(f, "\x1b[1;31merror:\x1b[0m {}: {}", kind, msg)?;
            write!(f, "\n\x1b[1;36mhint:\x1b[0m {}", self.hint())
        } else {
            writeln!(f, "error: {}: {}", kind, msg)?;
            write!(f, "\nhint: {}", self.hint())
        }
    }
}

impl std::error::Error for LayoutError {}

/// Check if colored output should be used
fn should_use_color() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}
