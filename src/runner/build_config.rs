//! Parsing of the core project's CMake build configuration.
//!
//! The version fields live in lines of the form `set(LEAN_VERSION_MINOR 7)`;
//! only line-prefix matching is done, mirroring how the fields are maintained.

/// Major version field name
pub const FIELD_MAJOR: &str = "LEAN_VERSION_MAJOR";
/// Minor version field name
pub const FIELD_MINOR: &str = "LEAN_VERSION_MINOR";
/// Patch version field name
pub const FIELD_PATCH: &str = "LEAN_VERSION_PATCH";
/// Release marker field name (`1` on release branches, `0` during development)
pub const FIELD_IS_RELEASE: &str = "LEAN_VERSION_IS_RELEASE";

/// Whether `content` contains a line setting `field` to exactly `value`.
pub fn has_setting(content: &str, field: &str, value: &str) -> bool {
    let needle = format!("set({field} {value})");
    content.lines().any(|line| line.trim().starts_with(&needle))
}

/// The numeric value `field` is set to, if present.
pub fn setting_value(content: &str, field: &str) -> Option<u32> {
    let needle = format!("set({field} ");
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(&needle)?;
        rest.trim_end_matches(')').trim().parse().ok()
    })
}
