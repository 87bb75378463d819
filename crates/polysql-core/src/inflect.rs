//! Table-name inflection.
//!
//! Table names derive from model type names: conventional suffixes and
//! generic markers are stripped, then the remainder is pluralized. The rules
//! cover the regular English cases plus the handful of irregulars that show
//! up in entity names; an explicit table-name override skips inflection
//! entirely.

/// Pluralizes a singular noun.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR {
        if lower == *singular {
            return with_case_of(word, plural);
        }
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !ends_with_vowel(stem) {
            return format!("{stem}ies");
        }
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singularizes a plural noun.
#[must_use]
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR {
        if lower == *plural {
            return with_case_of(word, singular);
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["ches", "shes", "xes", "zes", "ses"] {
        if let Some(stem) = word.strip_suffix("es") {
            if lower.ends_with(suffix) {
                return stem.to_string();
            }
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    word.to_string()
}

/// Derives a table name from a model type name.
///
/// Strips a trailing `Model` or `Entity` suffix and any generic-arity
/// marker, then pluralizes the remainder.
#[must_use]
pub fn table_name_for(type_name: &str) -> String {
    let bare = type_name.split('<').next().unwrap_or(type_name);
    let bare = bare.rsplit("::").next().unwrap_or(bare);
    let bare = bare
        .strip_suffix("Model")
        .or_else(|| bare.strip_suffix("Entity"))
        .unwrap_or(bare);
    pluralize(bare)
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("mouse", "mice"),
];

fn ends_with_vowel(word: &str) -> bool {
    word.chars()
        .next_back()
        .is_some_and(|c| "aeiouAEIOU".contains(c))
}

fn with_case_of(original: &str, replacement: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(head)) if first.is_uppercase() => {
            head.to_uppercase().collect::<String>() + chars.as_str()
        }
        (_, Some(head)) => head.to_string() + chars.as_str(),
        _ => String::new(),
    }
}
