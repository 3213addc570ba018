use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Values merged into the certificate template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateData {
    pub id: String,
    pub name: String,
    pub grade: String,

    /// Base64-encoded seal image
    pub medal: String,

    /// Effective date, DD/MM/YYYY
    pub date: String,
}

impl TemplateData {
    pub fn new(id: String, name: String, grade: String, medal: String, date: String) -> Self {
        Self {
            id,
            name,
            grade,
            medal,
            date,
        }
    }

    /// All placeholders with their values
    pub fn to_replacements(&self) -> HashMap<String, String> {
        let mut replacements = HashMap::new();
        replacements.insert("id".to_string(), self.id.clone());
        replacements.insert("name".to_string(), self.name.clone());
        replacements.insert("grade".to_string(), self.grade.clone());
        replacements.insert("medal".to_string(), self.medal.clone());
        replacements.insert("date".to_string(), self.date.clone());
        replacements
    }
}
