use super::errors::TranslationError;

/// Source module of an event, which fixes its payload schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Search,
    Catalog,
}

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, TranslationError> {
        match raw.trim() {
            "search" | "usuario" => Ok(Topic::Search),
            "catalog" | "prestador" => Ok(Topic::Catalog),
            other => Err(TranslationError::UnknownTopic(other.to_string())),
        }
    }
}
