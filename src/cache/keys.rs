//! Cache Key Scheme
//!
//! Builds and inspects the canonical `:`-separated keys used by every cache
//! consumer. Callers go through these helpers instead of formatting keys by hand.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::EntityKind;

/// Separator between key segments.
pub const SEPARATOR: char = ':';

const TRACKED_CHARACTERS: &str = "tracked:characters";
const TRACKED_SYSTEMS: &str = "tracked:systems";

// ASCII classes only; `(?-u)` keeps `\w` and `\d` from matching other scripts.
static ID_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^\w+:\w+:\d+$").expect("valid id key regex"));
static PAIR_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^\w+:\w+$").expect("valid pair key regex"));
static LONG_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^\w+(:\w+){3,4}$").expect("valid long key regex"));

// == Key Part ==
/// A single key segment: either a string or an integer identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Str(String),
    Int(i64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => f.write_str(s),
            KeyPart::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Str(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Str(s)
    }
}

impl From<&String> for KeyPart {
    fn from(s: &String) -> Self {
        KeyPart::Str(s.clone())
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        KeyPart::Int(n)
    }
}

impl From<i32> for KeyPart {
    fn from(n: i32) -> Self {
        KeyPart::Int(n.into())
    }
}

impl From<u32> for KeyPart {
    fn from(n: u32) -> Self {
        KeyPart::Int(n.into())
    }
}

// == Builders ==
/// Joins arbitrary parts with the separator.
pub fn join<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: Into<KeyPart>,
{
    parts
        .into_iter()
        .map(|p| p.into().to_string())
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Builds `prefix:entity_type:id[:extra...]`.
pub fn build(
    prefix: &str,
    entity_type: &str,
    id: impl Into<KeyPart>,
    extra: &[KeyPart],
) -> String {
    let mut parts = vec![KeyPart::from(prefix), KeyPart::from(entity_type), id.into()];
    parts.extend(extra.iter().cloned());
    join(parts)
}

/// Splits a key back into its segments.
pub fn parse(key: &str) -> Vec<String> {
    key.split(SEPARATOR).map(str::to_string).collect()
}

// == Inspection ==
/// Reduced form of a key used to group log lines.
///
/// `a:b:c` becomes `a:b`, `a:b` is returned unchanged, anything else becomes `a:*`.
pub fn pattern(key: &str) -> String {
    let parts: Vec<&str> = key.split(SEPARATOR).collect();
    match parts.as_slice() {
        [a, b, _] => format!("{}:{}", a, b),
        [_, _] => key.to_string(),
        [first, ..] => format!("{}:*", first),
        [] => key.to_string(),
    }
}

/// Returns true if the key has one of the accepted shapes:
/// `word:word:digits`, `word:word`, or four to five word segments.
/// Word and digit characters are ASCII only.
pub fn is_valid(key: &str) -> bool {
    ID_KEY.is_match(key) || PAIR_KEY.is_match(key) || LONG_KEY.is_match(key)
}

/// Keys whose absence reads as an empty list rather than a miss.
pub fn is_collection(key: &str) -> bool {
    key == TRACKED_CHARACTERS || key == TRACKED_SYSTEMS
}

// == Well-known Keys ==
pub fn tracked_characters() -> String {
    TRACKED_CHARACTERS.to_string()
}

pub fn tracked_systems() -> String {
    TRACKED_SYSTEMS.to_string()
}

/// List entry holding every tracked entity of a kind.
pub fn tracked_list(kind: EntityKind) -> String {
    match kind {
        EntityKind::Character => tracked_characters(),
        EntityKind::System => tracked_systems(),
    }
}

/// Per-entity data entry, e.g. `map:character:95465499`.
pub fn entity(kind: EntityKind, id: impl Into<KeyPart>) -> String {
    build("map", kind.as_str(), id, &[])
}

/// Per-entity tracked flag, e.g. `tracked:system:30000142`.
pub fn tracked_flag(kind: EntityKind, id: impl Into<KeyPart>) -> String {
    build("tracked", kind.as_str(), id, &[])
}

pub fn character(id: impl Into<KeyPart>) -> String {
    entity(EntityKind::Character, id)
}

pub fn system(id: impl Into<KeyPart>) -> String {
    entity(EntityKind::System, id)
}

pub fn character_tracked(id: impl Into<KeyPart>) -> String {
    tracked_flag(EntityKind::Character, id)
}

pub fn system_tracked(id: impl Into<KeyPart>) -> String {
    tracked_flag(EntityKind::System, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_stringifies_integers() {
        assert_eq!(build("map", "character", 95465499i64, &[]), "map:character:95465499");
        assert_eq!(build("map", "system", "30000142", &[]), "map:system:30000142");
        assert_eq!(build("esi", "killmail", 7, &[KeyPart::from("hash")]), "esi:killmail:7:hash");
        assert_eq!(build("a", "b", -5, &[]), "a:b:-5");
    }

    #[test]
    fn test_parse_recovers_parts() {
        let key = build("esi", "killmail", 42, &[KeyPart::from("abc"), KeyPart::Int(0)]);
        assert_eq!(parse(&key), vec!["esi", "killmail", "42", "abc", "0"]);
    }

    #[test]
    fn test_pattern() {
        assert_eq!(pattern("map:character:123"), "map:character");
        assert_eq!(pattern("tracked:systems"), "tracked:systems");
        assert_eq!(pattern("a:b:c:d"), "a:*");
        assert_eq!(pattern("single"), "single:*");
    }

    #[test]
    fn test_is_valid_accepts_known_shapes() {
        assert!(is_valid("map:character:95465499"));
        assert!(is_valid("tracked:systems"));
        assert!(is_valid("a:b:c:d"));
        assert!(is_valid("a:b:c:d:e"));
    }

    #[test]
    fn test_is_valid_rejects_other_shapes() {
        assert!(!is_valid(""));
        assert!(!is_valid("single"));
        assert!(!is_valid("a:b:c:d:e:f"));
        assert!(!is_valid("tracked:my-systems"));
        assert!(!is_valid("map:character:"));
        assert!(!is_valid(":a"));
    }

    #[test]
    fn test_is_valid_is_ascii_only() {
        assert!(!is_valid("ключ:б:١٢"));
        assert!(!is_valid("map:character:١٢٣"));
        assert!(!is_valid("tracked:systèmes"));
        assert!(is_valid("map_v2:system_x:30000142"));
    }

    #[test]
    fn test_three_segments_need_numeric_id() {
        // Literal regex classes: a 3-segment key with a word id is not accepted
        assert!(!is_valid("tracked:character:abc"));
        assert!(is_valid("tracked:character:123"));
    }

    #[test]
    fn test_well_known_keys() {
        assert_eq!(character(95465499i64), "map:character:95465499");
        assert_eq!(system("30000142"), "map:system:30000142");
        assert_eq!(character_tracked(1), "tracked:character:1");
        assert_eq!(system_tracked(2), "tracked:system:2");
        assert_eq!(tracked_list(EntityKind::Character), "tracked:characters");
        assert_eq!(tracked_list(EntityKind::System), "tracked:systems");
    }

    #[test]
    fn test_is_collection() {
        assert!(is_collection("tracked:characters"));
        assert!(is_collection("tracked:systems"));
        assert!(!is_collection("tracked:character:1"));
    }
}
