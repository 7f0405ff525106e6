//! Fundamental C types and specifier canonicalization.
//!
//! C lets type specifiers appear in any order (`long unsigned int`,
//! `int long unsigned`, ...). Canonicalization collapses every spelling into a
//! single key, which is then looked up in a fixed table. Keys missing from the
//! table become [`FundamentalType::Extension`] so compiler-specific types such
//! as `__int128` still resolve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fundamental (built-in) C type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundamentalType {
    Char,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    Void,
    /// A target or compiler extension type, named by its canonical key.
    Extension(String),
}

/// The fixed lookup table, keyed by canonical specifier key.
static FUNDAMENTAL_TYPES: &[(&str, FundamentalType)] = &[
    ("char", FundamentalType::Char),
    ("unsigned char", FundamentalType::UnsignedChar),
    ("short", FundamentalType::Short),
    ("unsigned short", FundamentalType::UnsignedShort),
    ("int", FundamentalType::Int),
    ("unsigned int", FundamentalType::UnsignedInt),
    ("long", FundamentalType::Long),
    ("unsigned long", FundamentalType::UnsignedLong),
    ("long long", FundamentalType::LongLong),
    ("unsigned long long", FundamentalType::UnsignedLongLong),
    ("float", FundamentalType::Float),
    ("double", FundamentalType::Double),
    ("long double", FundamentalType::LongDouble),
    ("void", FundamentalType::Void),
];

/// Keywords that may make up a fundamental type spelling.
const SPECIFIER_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "_Complex",
];

impl FundamentalType {
    /// Look up a canonical key, falling back to an extension type.
    pub fn from_key(key: &str) -> Self {
        FUNDAMENTAL_TYPES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, ty)| ty.clone())
            .unwrap_or_else(|| FundamentalType::Extension(key.to_string()))
    }

    /// The C spelling of this type.
    pub fn c_name(&self) -> &str {
        match self {
            FundamentalType::Extension(name) => name,
            other => FUNDAMENTAL_TYPES
                .iter()
                .find(|(_, ty)| ty == other)
                .map(|(k, _)| *k)
                .unwrap_or("void"),
        }
    }
}

impl fmt::Display for FundamentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

/// Canonicalize an unordered list of specifier tokens into a lookup key.
///
/// `signed` is dropped, `unsigned` moves to the front, repeated `long`s are
/// kept (so `long long` stays distinct), `short` follows the long group and a
/// redundant `int` is dropped when `short` or `long` is present. A bare
/// `unsigned`/`signed` means `int`.
pub fn canonical_key<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut unsigned = false;
    let mut longs = 0usize;
    let mut short = false;
    let mut base: Vec<&str> = Vec::new();

    for token in tokens {
        match token.as_ref() {
            "signed" => {}
            "unsigned" => unsigned = true,
            "long" => longs += 1,
            "short" => short = true,
            other => base.push(other),
        }
    }

    if short || longs > 0 {
        base.retain(|t| *t != "int");
    } else if base.is_empty() {
        base.push("int");
    }
    // `_Complex` trails its base type
    base.sort_by_key(|t| (*t == "_Complex", *t));

    let mut parts: Vec<&str> = Vec::with_capacity(tokens.len() + 1);
    if unsigned {
        parts.push("unsigned");
    }
    parts.extend(std::iter::repeat("long").take(longs));
    if short {
        parts.push("short");
    }
    parts.extend(base);
    parts.join(" ")
}

/// Whether an identifier token list spells a fundamental type.
///
/// True when every token is a C specifier keyword, or when the list is a
/// single reserved implementation identifier (`__int128`, `_Float128`,
/// `__builtin_va_list`, ...).
pub fn is_specifier_sequence<S: AsRef<str>>(names: &[S]) -> bool {
    if names.is_empty() {
        return false;
    }
    if names
        .iter()
        .all(|n| SPECIFIER_KEYWORDS.contains(&n.as_ref()))
    {
        return true;
    }
    names.len() == 1 && is_reserved_identifier(names[0].as_ref())
}

fn is_reserved_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('_'), Some('_')) => true,
        (Some('_'), Some(c)) => c.is_ascii_uppercase(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_independent() {
        assert_eq!(canonical_key(&["long", "unsigned", "int"]), "unsigned long");
        assert_eq!(canonical_key(&["int", "unsigned", "long"]), "unsigned long");
        assert_eq!(canonical_key(&["_Complex", "double"]), "double _Complex");
        assert_eq!(canonical_key(&["double", "_Complex"]), "double _Complex");
        assert_eq!(
            canonical_key(&["_Complex", "double", "long"]),
            canonical_key(&["long", "double", "_Complex"])
        );
    }

    #[test]
    fn long_long_kept_distinct() {
        assert_eq!(canonical_key(&["long", "long"]), "long long");
        assert_eq!(canonical_key(&["long", "int", "long", "unsigned"]), "unsigned long long");
        assert_eq!(canonical_key(&["long"]), "long");
    }

    #[test]
    fn short_and_redundant_int() {
        assert_eq!(canonical_key(&["short", "int", "unsigned"]), "unsigned short");
        assert_eq!(canonical_key(&["int", "short"]), "short");
    }

    #[test]
    fn signed_dropped() {
        assert_eq!(canonical_key(&["signed", "char"]), "char");
        assert_eq!(canonical_key(&["signed"]), "int");
        assert_eq!(canonical_key(&["unsigned"]), "unsigned int");
    }

    #[test]
    fn long_double() {
        let key = canonical_key(&["double", "long"]);
        assert_eq!(key, "long double");
        assert_eq!(FundamentalType::from_key(&key), FundamentalType::LongDouble);
    }

    #[test]
    fn unknown_key_is_extension() {
        let ty = FundamentalType::from_key(&canonical_key(&["__int128"]));
        assert_eq!(ty, FundamentalType::Extension("__int128".into()));
        assert_eq!(ty.c_name(), "__int128");
    }

    #[test]
    fn table_names_round_trip() {
        for (key, ty) in FUNDAMENTAL_TYPES {
            assert_eq!(ty.c_name(), *key);
            assert_eq!(FundamentalType::from_key(key), *ty);
        }
    }

    #[test]
    fn specifier_sequences() {
        assert!(is_specifier_sequence(&["unsigned", "long"]));
        assert!(is_specifier_sequence(&["_Bool"]));
        assert!(is_specifier_sequence(&["__builtin_va_list"]));
        assert!(!is_specifier_sequence(&["size_t"]));
        assert!(!is_specifier_sequence(&["Foo"]));
        assert!(!is_specifier_sequence::<&str>(&[]));
    }
}
