//! Latest text of every open document.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ContentStore {
    documents: HashMap<String, String>,
}

impl ContentStore {
    pub fn set(&mut self, uri: &str, text: String) {
        self.documents.insert(uri.to_string(), text);
    }

    pub fn get(&self, uri: &str) -> Option<&str> {
        self.documents.get(uri).map(String::as_str)
    }

    /// Document lines split on `\n`; empty for unknown documents.
    pub fn lines(&self, uri: &str) -> Vec<String> {
        self.get(uri)
            .map(|text| text.split('\n').map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn remove(&mut self, uri: &str) -> Option<String> {
        self.documents.remove(uri)
    }
}
