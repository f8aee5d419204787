//! `${variable}` expansion for settings values.
//!
//! Launch configurations may reference install-time paths that are only
//! known once the server resource has been resolved, e.g.
//! `${server_directory_path}/_resources/typings`. Expansion walks JSON
//! values recursively and substitutes into every string; unknown variables
//! are left untouched so the host can run its own expansion pass afterwards.

use serde_json::Value;
use std::collections::BTreeMap;

/// Variable table used for `${name}` substitution.
pub type Variables = BTreeMap<String, String>;

/// Expands `${name}` references in `value` in place.
///
/// Strings are substituted, arrays and objects are walked recursively, and
/// all other node types are left as-is.
///
/// # Examples
///
/// ```
/// use pylance_core::{Variables, expand_variables};
/// use serde_json::json;
///
/// let mut vars = Variables::new();
/// vars.insert("server_path".to_string(), "/tmp/server.js".to_string());
///
/// let mut value = json!({"cmd": ["node", "${server_path}"]});
/// expand_variables(&mut value, &vars);
/// assert_eq!(value["cmd"][1], "/tmp/server.js");
/// ```
pub fn expand_variables(value: &mut Value, variables: &Variables) {
    match value {
        Value::String(s) => {
            if s.contains("${") {
                *s = expand_str(s, variables);
            }
        }
        Value::Array(items) => {
            for item in items {
                expand_variables(item, variables);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                expand_variables(item, variables);
            }
        }
        _ => {}
    }
}

fn expand_str(input: &str, variables: &Variables) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match variables.get(name) {
                    Some(replacement) => out.push_str(replacement),
                    // unknown variable: keep the reference verbatim
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Variables {
        let mut v = Variables::new();
        v.insert("package_storage".into(), "/storage".into());
        v.insert("server_directory_path".into(), "/storage/pkg/id~1.0".into());
        v
    }

    #[test]
    fn expands_nested_strings() {
        let mut value = json!({
            "python": {
                "analysis": {
                    "extraPaths": ["${server_directory_path}/_resources/typings"]
                }
            }
        });
        expand_variables(&mut value, &vars());
        assert_eq!(
            value["python"]["analysis"]["extraPaths"][0],
            "/storage/pkg/id~1.0/_resources/typings"
        );
    }

    #[test]
    fn leaves_unknown_variables_verbatim() {
        let mut value = json!("${workspaceFolder}/src");
        expand_variables(&mut value, &vars());
        assert_eq!(value, "${workspaceFolder}/src");
    }

    #[test]
    fn leaves_non_strings_alone() {
        let mut value = json!({"n": 3, "b": true, "s": "${package_storage}"});
        expand_variables(&mut value, &vars());
        assert_eq!(value["n"], 3);
        assert_eq!(value["s"], "/storage");
    }

    #[test]
    fn unterminated_reference_is_kept() {
        let mut value = json!("${package_storage");
        expand_variables(&mut value, &vars());
        assert_eq!(value, "${package_storage");
    }
}
