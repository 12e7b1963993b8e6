use crate::engine::key::{ArtifactKey, Category};
use serde_json::{Value, json};
use std::collections::HashMap;

pub struct ArtifactKeyFactory {
    params: HashMap<String, Value>,
}

impl ArtifactKeyFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("category".into(), json!("MC"));
        params.insert("channel".into(), json!("ZeeJet"));
        params.insert("era".into(), json!("2017"));
        params.insert("sample".into(), json!("DYJetsToLLM50"));
        Self { params }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> ArtifactKey {
        let category = match self.params["category"].as_str().unwrap() {
            "Data" => Category::Data,
            _ => Category::Mc,
        };
        ArtifactKey::new(
            category,
            self.params["channel"].as_str().unwrap(),
            self.params["era"].as_str().unwrap(),
            self.params["sample"].as_str().unwrap(),
        )
    }
}
