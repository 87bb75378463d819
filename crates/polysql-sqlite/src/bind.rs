//! Named-placeholder rewriting.
//!
//! Statement text arrives with `@Name` placeholders and an ordered
//! parameter map. The sqlx SQLite driver binds positionally, so each
//! placeholder is rewritten to `?` and its value collected in occurrence
//! order. Binding is strictly sequential. Parameters present in the map but
//! absent from the text are simply not bound.

use polysql_core::{ParameterMap, Value};
use polysql_orm::OrmError;

/// Rewrites `@Name` placeholders to `?` and returns the values to bind, in
/// the order the placeholders occur.
///
/// Text inside single-quoted string literals is left untouched, as is a
/// doubled `@@` (engine variables in other dialects).
pub fn expand_named_parameters(
    sql: &str,
    params: &ParameterMap,
) -> Result<(String, Vec<Value>), OrmError> {
    let mut text = String::with_capacity(sql.len());
    let mut values = Vec::with_capacity(params.len());
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '\'' {
            in_string = !in_string;
            text.push(c);
            i += 1;
            continue;
        }
        if in_string || c != '@' {
            text.push(c);
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'@') {
            text.push_str("@@");
            i += 2;
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while end < bytes.len() {
            let ch = bytes[end] as char;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                end += 1;
            } else {
                break;
            }
        }
        if end == start {
            text.push(c);
            i += 1;
            continue;
        }

        let name = &sql[start..end];
        let value = params.get(name).ok_or_else(|| {
            OrmError::Mapping(format!("no value bound for parameter '@{name}'"))
        })?;
        text.push('?');
        values.push(value.clone());
        i = end;
    }

    Ok((text, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, Value)]) -> ParameterMap {
        let mut map = ParameterMap::new();
        for (name, value) in entries {
            map.insert(*name, value.clone());
        }
        map
    }

    #[test]
    fn rewrites_in_occurrence_order() {
        let map = params(&[
            ("Email", Value::Text("e".into())),
            ("FirstName1", Value::Text("%Bo%".into())),
        ]);
        let (sql, values) = expand_named_parameters(
            "SELECT * FROM [Authors] WHERE [FirstName] LIKE @FirstName1 AND [Email] = @Email",
            &map,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM [Authors] WHERE [FirstName] LIKE ? AND [Email] = ?"
        );
        assert_eq!(
            values,
            vec![Value::Text("%Bo%".into()), Value::Text("e".into())]
        );
    }

    #[test]
    fn repeated_placeholder_binds_twice() {
        let map = params(&[("Id", Value::Int(5))]);
        let (sql, values) =
            expand_named_parameters("UPDATE [T] SET [A] = @Id WHERE [B] = @Id", &map).unwrap();
        assert_eq!(sql, "UPDATE [T] SET [A] = ? WHERE [B] = ?");
        assert_eq!(values, vec![Value::Int(5), Value::Int(5)]);
    }

    #[test]
    fn unused_parameters_are_ignored() {
        let map = params(&[("Id", Value::Int(5)), ("Extra", Value::Int(9))]);
        let (_, values) = expand_named_parameters("DELETE FROM [T] WHERE [A] = @Id", &map).unwrap();
        assert_eq!(values, vec![Value::Int(5)]);
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let map = params(&[]);
        let err = expand_named_parameters("SELECT @Nope", &map).unwrap_err();
        assert!(matches!(err, OrmError::Mapping(_)));
    }

    #[test]
    fn string_literals_are_untouched() {
        let map = params(&[("A", Value::Int(1))]);
        let (sql, values) =
            expand_named_parameters("SELECT 'user@example.com', @A", &map).unwrap();
        assert_eq!(sql, "SELECT 'user@example.com', ?");
        assert_eq!(values, vec![Value::Int(1)]);
    }

    #[test]
    fn doubled_at_passes_through() {
        let map = params(&[]);
        let (sql, values) = expand_named_parameters("SELECT @@ROWCOUNT", &map).unwrap();
        assert_eq!(sql, "SELECT @@ROWCOUNT");
        assert!(values.is_empty());
    }
}
