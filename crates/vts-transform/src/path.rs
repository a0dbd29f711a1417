//! Token path construction.
//!
//! DTCG paths are dot-separated (`colors.brand`), native paths are
//! slash-separated (`Brand/Primary`).

/// Prefix for paths of variables that live outside the local document.
pub const EXTERNAL_PREFIX: &str = "external";

/// Lower-cases `input`, turns whitespace runs into `-` and strips every
/// character outside `[a-z0-9-]`.
///
/// Underscores, slashes and non-ASCII letters are stripped too:
/// `"Brand/Primary_1"` becomes `"brandprimary1"`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// DTCG token path for a variable.
///
/// A name that already contains `.` is an explicit hierarchy and is used
/// unchanged. Otherwise the path is `{slug(collection)}.{slug(variable)}`.
#[must_use]
pub fn build_token_path(collection_name: &str, variable_name: &str) -> String {
    if variable_name.contains('.') {
        return variable_name.to_string();
    }
    format!("{}.{}", slugify(collection_name), slugify(variable_name))
}

/// DTCG path for a library variable fetched by id.
#[must_use]
pub fn external_token_path(variable_name: &str) -> String {
    format!("{EXTERNAL_PREFIX}.{}", slugify(variable_name))
}

/// Deterministic path for a referenced variable that could not be fetched.
#[must_use]
pub fn external_fallback_path(variable_id: &str) -> String {
    let short: String = variable_id.chars().take(8).collect();
    format!("{EXTERNAL_PREFIX}.unknown-{short}")
}

/// A variable name split into native group segments and a leaf name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePath {
    /// Group names, outermost first. Empty for direct collection children.
    pub groups: Vec<String>,
    /// The variable's own name.
    pub leaf: String,
}

impl NativePath {
    /// Splits a variable name on `/`, trimming every segment.
    ///
    /// Empty segments are dropped.
    #[must_use]
    pub fn parse(variable_name: &str) -> Self {
        let mut segments: Vec<String> = variable_name
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        let leaf = segments
            .pop()
            .unwrap_or_else(|| variable_name.trim().to_string());
        Self {
            groups: segments,
            leaf,
        }
    }

    /// Full path within the collection, e.g. `Brand/Primary`.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.groups.is_empty() {
            return self.leaf.clone();
        }
        format!("{}/{}", self.groups.join("/"), self.leaf)
    }

    /// Group path prefixed by the collection name, e.g. `Colors/Brand`.
    ///
    /// `None` when the variable sits directly in the collection.
    #[must_use]
    pub fn group_path(&self, collection_name: &str) -> Option<String> {
        if self.groups.is_empty() {
            return None;
        }
        Some(format!("{collection_name}/{}", self.groups.join("/")))
    }

    /// Path that addresses the variable across collections.
    #[must_use]
    pub fn qualified(&self, collection_name: &str) -> String {
        format!("{collection_name}/{}", self.full_path())
    }
}
