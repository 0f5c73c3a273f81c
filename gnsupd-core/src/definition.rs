//! Definition file loading.
//!
//! A definition is a UTF-8 JSON object holding the set's address ranges under
//! `nets`:
//!
//! ```json
//! { "nets": ["10.100.11.0/24", "192.168.7.0/24"] }
//! ```
//!
//! The `nets` key is matched case-insensitively and the last match wins.
//! Other keys are ignored. A missing or `null` `nets`, and a document that
//! is just `null`, mean an empty set. Range strings are not validated here;
//! the policy store decides.

use std::fmt;
use std::path::Path;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::LoadError;
use crate::types::{SetDefinition, SetName};

const NETS_KEY: &str = "nets";

#[derive(Debug, Default)]
struct DefinitionFile {
    nets: Option<Vec<String>>,
}

impl<'de> Deserialize<'de> for DefinitionFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FileVisitor;

        impl<'de> Visitor<'de> for FileVisitor {
            type Value = DefinitionFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DefinitionFile, A::Error> {
                let mut file = DefinitionFile::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case(NETS_KEY) {
                        file.nets = map.next_value()?;
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(file)
            }
        }

        deserializer.deserialize_map(FileVisitor)
    }
}

/// Parse definition content. `path` is only used for error context.
pub fn parse_networks(path: &Path, contents: &str) -> Result<Vec<String>, LoadError> {
    let file: Option<DefinitionFile> =
        serde_json::from_str(contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file.and_then(|f| f.nets).unwrap_or_default())
}

/// Read and parse the address ranges stored in `path`.
pub fn load_networks(path: &Path) -> Result<Vec<String>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_networks(path, &contents)
}

/// Load the definition of set `name` from `path`.
pub fn load_definition(
    path: &Path,
    name: SetName,
    extra_label: Option<&str>,
) -> Result<SetDefinition, LoadError> {
    let networks = load_networks(path)?;
    Ok(SetDefinition {
        name,
        networks,
        extra_label: extra_label
            .filter(|label| !label.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn p() -> &'static Path {
        Path::new("test.json")
    }

    #[rstest]
    #[case::single(r#"{"nets":["10.0.0.0/24"]}"#, &["10.0.0.0/24"])]
    #[case::empty_object("{}", &[])]
    #[case::null_nets(r#"{"nets":null}"#, &[])]
    #[case::unknown_keys(r#"{"comment":"office","nets":["a","b"]}"#, &["a", "b"])]
    #[case::not_validated(r#"{"nets":["not-a-cidr","::1/128"]}"#, &["not-a-cidr", "::1/128"])]
    #[case::capitalised_key(r#"{"Nets":["1.2.3.0/24"]}"#, &["1.2.3.0/24"])]
    #[case::upper_case_key(r#"{"NETS":["1.2.3.0/24"]}"#, &["1.2.3.0/24"])]
    #[case::last_match_wins(r#"{"nets":["a"],"Nets":["b"]}"#, &["b"])]
    #[case::later_null_clears(r#"{"Nets":["a"],"nets":null}"#, &[])]
    #[case::top_level_null("null", &[])]
    #[case::top_level_null_padded(" null\n", &[])]
    fn parses_valid_documents(#[case] input: &str, #[case] expected: &[&str]) {
        let nets = parse_networks(p(), input).expect("parse");
        assert_eq!(nets, expected);
    }

    #[rstest]
    #[case::truncated(r#"{"nets":["10.0.0.0/24""#)]
    #[case::wrong_type(r#"{"nets":"10.0.0.0/24"}"#)]
    #[case::non_string_entry(r#"{"nets":[10]}"#)]
    #[case::top_level_array(r#"[["10.0.0.0/24"]]"#)]
    #[case::top_level_string(r#""10.0.0.0/24""#)]
    #[case::capitalised_key_wrong_type(r#"{"Nets":"10.0.0.0/24"}"#)]
    #[case::empty("")]
    fn rejects_malformed_documents(#[case] input: &str) {
        let err = parse_networks(p(), input).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("test.json"));
    }

    #[test]
    fn load_definition_drops_empty_extra_label() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("vpn.json");
        std::fs::write(&path, r#"{"nets":["10.8.0.0/16"]}"#).expect("write");

        let def = load_definition(&path, SetName::from("vpn"), Some("")).expect("load");
        assert_eq!(def.extra_label, None);
        assert_eq!(def.networks, vec!["10.8.0.0/16"]);
    }
}
