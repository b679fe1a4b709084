//! Draft-07 validation of response payloads with aggregated diagnostics
//!
//! Every violation is collected, sorted by its location in the instance and
//! rendered as `<path> -> <message>`. The offending instance is attached,
//! pretty-printed and cut to a fixed preview length unless verbose.

use std::fmt::Write as _;

use serde_json::Value;

use crate::config::DEFAULT_TRUNCATE_AT;

const TRUNCATION_MARKER: &str = "...\n[TRUNCATED] (pass -v to show)\n";
const SEPARATOR: &str = "------------------------------------------------";

/// One step into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

/// Location of a violation inside the validated instance.
///
/// Orders segment by segment; a parent sorts before its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an RFC 6901 JSON Pointer (`""` is the root).
    #[must_use]
    pub fn from_pointer(pointer: &str) -> Self {
        if pointer.is_empty() {
            return Self::root();
        }
        let segments = pointer
            .strip_prefix('/')
            .unwrap_or(pointer)
            .split('/')
            .map(|raw| {
                let token = raw.replace("~1", "/").replace("~0", "~");
                match token.parse::<usize>() {
                    Ok(i) if !token.starts_with('+') => PathSegment::Index(i),
                    _ => PathSegment::Key(token),
                }
            })
            .collect();
        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

/// Rendered as a list of steps: `[0, 'gender']`, with `[]` for the root.
impl std::fmt::Display for InstancePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match segment {
                PathSegment::Index(n) => write!(f, "{n}")?,
                PathSegment::Key(k) => write_quoted(f, k)?,
            }
        }
        f.write_str("]")
    }
}

/// Single quotes unless the key holds one and no double quote.
fn write_quoted(f: &mut std::fmt::Formatter<'_>, key: &str) -> std::fmt::Result {
    let quote = if key.contains('\'') && !key.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in key.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: InstancePath,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.path, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationFailure {
    /// The schema itself does not compile.
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),
    /// The instance does not conform; `diagnostic` is the full report.
    #[error("{diagnostic}")]
    Mismatch {
        violations: Vec<Violation>,
        diagnostic: String,
    },
}

/// Validates instances against Draft-07 schemas.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator {
    verbose: bool,
    truncate_at: usize,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self {
            verbose: false,
            truncate_at: DEFAULT_TRUNCATE_AT,
        }
    }
}

impl SchemaValidator {
    #[must_use]
    pub fn new(verbose: bool, truncate_at: usize) -> Self {
        Self {
            verbose,
            truncate_at,
        }
    }

    /// Validate `instance` against `schema`.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` if the schema does not compile, `Mismatch` with every
    /// violation (sorted by path) otherwise.
    pub fn validate(&self, instance: &Value, schema: &Value) -> Result<(), ValidationFailure> {
        let violations = collect_violations(instance, schema)?;
        if violations.is_empty() {
            return Ok(());
        }
        let limit = (!self.verbose).then_some(self.truncate_at);
        let diagnostic = render_diagnostic(instance, &violations, limit);
        tracing::debug!(violations = violations.len(), "schema validation failed");
        Err(ValidationFailure::Mismatch {
            violations,
            diagnostic,
        })
    }
}

/// All violations of `instance` against `schema`, sorted by path.
///
/// # Errors
///
/// Returns `InvalidSchema` if the schema does not compile.
pub fn collect_violations(
    instance: &Value,
    schema: &Value,
) -> Result<Vec<Violation>, ValidationFailure> {
    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .build(schema)
        .map_err(|e| ValidationFailure::InvalidSchema(e.to_string()))?;

    let mut violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            path: InstancePath::from_pointer(e.instance_path().as_str()),
            message: e.to_string(),
        })
        .collect();
    violations.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
    Ok(violations)
}

/// Render the failure report. `limit` caps the instance preview in characters.
#[must_use]
pub fn render_diagnostic(instance: &Value, violations: &[Violation], limit: Option<usize>) -> String {
    let pretty = serde_json::to_string_pretty(instance).unwrap_or_else(|_| instance.to_string());
    let shown = match limit {
        Some(max) => truncate_chars(&pretty, max),
        None => pretty,
    };
    let errors = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    format!("Instance:\n{shown}\n\nJSON schema validation errors:\n{errors}\n{SEPARATOR}\n")
}

/// Keep the first `max` characters, appending the truncation marker if cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}{TRUNCATION_MARKER}", &text[..end]),
        None => text.to_string(),
    }
}
