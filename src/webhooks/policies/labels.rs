//! Label key and value syntax checks, as enforced by the API server for
//! object labels and label selectors.

use std::sync::LazyLock;

/// Maximum length of a label value and of the name part of a key
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a DNS-1123 subdomain key prefix
pub const MAX_PREFIX_LENGTH: usize = 253;

// Pattern: ^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$
static NAME_RE: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").ok());

// Pattern: DNS-1123 subdomain
static PREFIX_RE: LazyLock<Option<regex::Regex>> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").ok()
});

fn is_name(s: &str) -> bool {
    NAME_RE.as_ref().is_some_and(|re| re.is_match(s))
}

fn is_prefix(s: &str) -> bool {
    PREFIX_RE.as_ref().is_some_and(|re| re.is_match(s))
}

/// Check a label key (`[prefix/]name`). Returns every problem found.
pub fn qualified_name_errors(key: &str) -> Vec<String> {
    let mut errs = Vec::new();
    let parts: Vec<&str> = key.split('/').collect();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty() {
                errs.push("prefix part must be non-empty".to_string());
            } else {
                if prefix.len() > MAX_PREFIX_LENGTH {
                    errs.push(format!(
                        "prefix part must be no more than {} characters",
                        MAX_PREFIX_LENGTH
                    ));
                }
                if !is_prefix(prefix) {
                    errs.push(
                        "prefix part must consist of lower case alphanumeric characters, '-' or '.'"
                            .to_string(),
                    );
                }
            }
            *name
        }
        _ => {
            errs.push(
                "a qualified name must consist of an optional DNS subdomain prefix and a name separated by '/'"
                    .to_string(),
            );
            return errs;
        }
    };

    if name.is_empty() {
        errs.push("name part must be non-empty".to_string());
    } else {
        if name.len() > MAX_LABEL_LENGTH {
            errs.push(format!(
                "name part must be no more than {} characters",
                MAX_LABEL_LENGTH
            ));
        }
        if !is_name(name) {
            errs.push(
                "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character"
                    .to_string(),
            );
        }
    }
    errs
}

/// Check a label value. Empty values are allowed.
pub fn label_value_errors(value: &str) -> Vec<String> {
    let mut errs = Vec::new();
    if value.len() > MAX_LABEL_LENGTH {
        errs.push(format!(
            "must be no more than {} characters",
            MAX_LABEL_LENGTH
        ));
    }
    if !value.is_empty() && !is_name(value) {
        errs.push(
            "a valid label must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    errs
}
