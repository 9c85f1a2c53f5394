/// A caller-supplied search query in either input form.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A query in the string grammar, e.g. `name:"john" AND (age>30 OR active:true)`
    Text(String),

    /// A structured mapping, e.g. `{"name": "john", "age": {"gt": 30}}`
    Mapping(serde_json::Value),
}

impl Query {
    /// Blank queries apply no constraint at all.
    pub fn is_blank(&self) -> bool {
        match self {
            Query::Text(text) => text.trim().is_empty(),
            Query::Mapping(serde_json::Value::Null) => true,
            Query::Mapping(serde_json::Value::Object(map)) => map.is_empty(),
            Query::Mapping(_) => false,
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<serde_json::Value> for Query {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Query::Text(text),
            other => Query::Mapping(other),
        }
    }
}
