use graphql_parser::Style;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::prelude::{q, r};

/// Variable values for a GraphQL query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryVariables(HashMap<String, r::Value>);

impl QueryVariables {
    pub fn new(variables: HashMap<String, r::Value>) -> Self {
        QueryVariables(variables)
    }
}

impl Deref for QueryVariables {
    type Target = HashMap<String, r::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for QueryVariables {
    fn deref_mut(&mut self) -> &mut HashMap<String, r::Value> {
        &mut self.0
    }
}

impl<'de> Deserialize<'de> for QueryVariables {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: BTreeMap<String, serde_json::Value> = Deserialize::deserialize(deserializer)?;
        Ok(QueryVariables(
            pairs
                .into_iter()
                .map(|(k, v)| (k, r::Value::from(v)))
                .collect(),
        ))
    }
}

impl Serialize for QueryVariables {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Sort keys so the logged text is stable between runs
        let sorted: BTreeMap<_, _> = self.0.iter().collect();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (k, v) in sorted {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A GraphQL query as submitted by a client.
#[derive(Clone, Debug)]
pub struct Query {
    pub document: q::Document,
    pub variables: Option<QueryVariables>,
    pub operation_name: Option<String>,
    /// Only used for logging
    pub query_text: Arc<String>,
    pub variables_text: Arc<String>,
}

impl Query {
    pub fn new(
        document: q::Document,
        variables: Option<QueryVariables>,
        operation_name: Option<String>,
    ) -> Self {
        let query_text = Arc::new(
            document
                .format(&Style::default().indent(0))
                .replace('\n', " "),
        );
        let variables_text = Arc::new(
            variables
                .as_ref()
                .and_then(|vars| serde_json::to_string(vars).ok())
                .unwrap_or_default(),
        );
        Query {
            document,
            variables,
            operation_name,
            query_text,
            variables_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_deserialize_into_result_values() {
        let vars: QueryVariables =
            serde_json::from_str(r#"{"id": "1", "n": 3, "flag": true, "nothing": null}"#).unwrap();

        assert_eq!(vars.get("id"), Some(&r::Value::String("1".to_owned())));
        assert_eq!(vars.get("n"), Some(&r::Value::Int(3)));
        assert_eq!(vars.get("flag"), Some(&r::Value::Boolean(true)));
        assert_eq!(vars.get("nothing"), Some(&r::Value::Null));
    }

    #[test]
    fn query_text_is_a_single_line() {
        let document = graphql_parser::parse_query("{\n  user(id: \"1\") {\n    name\n  }\n}")
            .unwrap()
            .into_static();
        let query = Query::new(document, None, None);
        assert!(!query.query_text.contains('\n'));
        assert!(query.query_text.contains("user(id: \"1\")"));
    }
}
