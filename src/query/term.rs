/// A word looked up in one index, optionally through one of its truncate
/// profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    index_name: String,
    word: String,
    truncate_name: Option<String>,
}

impl Term {
    pub fn new(index_name: String, word: String) -> Self {
        Self {
            index_name,
            word,
            truncate_name: None,
        }
    }

    pub fn with_truncate_name(mut self, truncate_name: String) -> Self {
        self.truncate_name = Some(truncate_name);
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn truncate_name(&self) -> Option<&str> {
        self.truncate_name.as_deref()
    }

    pub fn has_truncate_name(&self) -> bool {
        self.truncate_name.is_some()
    }
}
