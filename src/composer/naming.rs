use regex::Regex;

/// The introspectable name shared by every class composed without an
/// honoured name. Collisions between anonymous classes are expected.
pub const ANONYMOUS_CLASS: &str = "AnonymousClass";

/// Whether supplied class names are honoured in introspection. The policy
/// is per composer and inherited down the extension chain, never a
/// process-wide toggle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NamingMode {
    /// Collapse every supplied name to [`ANONYMOUS_CLASS`]. The default.
    Anonymous,
    /// Honour supplied names, sanitized.
    Dev,
}

impl Default for NamingMode {
    fn default() -> Self {
        NamingMode::Anonymous
    }
}

lazy_static! {
    static ref NAME_HEAD: Regex = Regex::new(r"^\w+").unwrap();
}

/// Resolves the introspectable name for a class under the given policy.
pub fn resolve_name(mode: NamingMode, supplied: Option<&str>) -> String {
    match (mode, supplied) {
        (NamingMode::Dev, Some(raw)) => sanitize_name(raw),
        _ => ANONYMOUS_CLASS.to_string(),
    }
}

/// Reduces a supplied name to an identifier: the final path segment,
/// truncated at the first non-word character. Names with no usable head
/// fall back to the anonymous placeholder.
pub fn sanitize_name(raw: &str) -> String {
    let base = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(raw);
    match NAME_HEAD.find(base) {
        Some(m) => m.as_str().to_string(),
        None => ANONYMOUS_CLASS.to_string(),
    }
}
