use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AuthorId, WorkId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkError {
    #[error("work title cannot be empty")]
    EmptyTitle,

    #[error("author name cannot be empty")]
    EmptyAuthorName,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Catalog shelf a work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Works on the national exam (ZNO/NMT) reading list.
    Zno,
    Modern,
    Classic,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Zno => "zno",
            Category::Modern => "modern",
            Category::Classic => "classic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = WorkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zno" => Ok(Category::Zno),
            "modern" => Ok(Category::Modern),
            "classic" => Ok(Category::Classic),
            other => Err(WorkError::UnknownCategory(other.to_owned())),
        }
    }
}

//
// ─── AUTHOR ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: AuthorId,
    name: String,
}

impl Author {
    /// # Errors
    ///
    /// Returns `WorkError::EmptyAuthorName` if the name is blank.
    pub fn new(id: AuthorId, name: impl Into<String>) -> Result<Self, WorkError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(WorkError::EmptyAuthorName);
        }
        Ok(Self { id, name })
    }

    #[must_use]
    pub fn id(&self) -> AuthorId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

//
// ─── WORK ──────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a work, as read from seed data or storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDraft {
    pub title: String,
    pub author_id: AuthorId,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub full_text: Option<String>,
    pub summary: Option<String>,
    pub characters: Option<String>,
    pub themes: Option<String>,
    pub quotes: Vec<String>,
}

impl WorkDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, author_id: AuthorId) -> Self {
        Self {
            title: title.into(),
            author_id,
            description: None,
            category: None,
            year: None,
            genre: None,
            full_text: None,
            summary: None,
            characters: None,
            themes: None,
            quotes: Vec::new(),
        }
    }

    /// Validate the draft and attach its identifier.
    ///
    /// # Errors
    ///
    /// Returns `WorkError::EmptyTitle` if the title is blank.
    pub fn validate(self, id: WorkId) -> Result<Work, WorkError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(WorkError::EmptyTitle);
        }

        Ok(Work {
            id,
            title,
            author_id: self.author_id,
            description: normalize_optional(self.description),
            category: self.category,
            year: self.year,
            genre: normalize_optional(self.genre),
            full_text: self.full_text,
            summary: normalize_optional(self.summary),
            characters: normalize_optional(self.characters),
            themes: normalize_optional(self.themes),
            quotes: self
                .quotes
                .into_iter()
                .map(|q| q.trim().to_owned())
                .filter(|q| !q.is_empty())
                .collect(),
        })
    }
}

/// A literary work. Immutable once seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    id: WorkId,
    title: String,
    author_id: AuthorId,
    description: Option<String>,
    category: Option<Category>,
    year: Option<i32>,
    genre: Option<String>,
    full_text: Option<String>,
    summary: Option<String>,
    characters: Option<String>,
    themes: Option<String>,
    quotes: Vec<String>,
}

impl Work {
    #[must_use]
    pub fn id(&self) -> WorkId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author_id(&self) -> AuthorId {
        self.author_id
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    #[must_use]
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    /// Full text, or an empty string when the work has none.
    #[must_use]
    pub fn full_text(&self) -> &str {
        self.full_text.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn characters(&self) -> Option<&str> {
        self.characters.as_deref()
    }

    #[must_use]
    pub fn themes(&self) -> Option<&str> {
        self.themes.as_deref()
    }

    #[must_use]
    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    #[must_use]
    pub fn is_in(&self, category: Category) -> bool {
        self.category == Some(category)
    }
}

/// A work joined with its author, as shown in list and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkWithAuthor {
    pub work: Work,
    pub author: Author,
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let err = WorkDraft::new("   ", AuthorId::new(1))
            .validate(WorkId::new(1))
            .unwrap_err();
        assert_eq!(err, WorkError::EmptyTitle);
    }

    #[test]
    fn validate_trims_metadata_and_drops_empty_quotes() {
        let draft = WorkDraft {
            genre: Some("  ".into()),
            quotes: vec!["  Тиха вода греблю рве. ".into(), String::new()],
            ..WorkDraft::new("Кайдашева сім'я", AuthorId::new(1))
        };

        let work = draft.validate(WorkId::new(3)).unwrap();
        assert_eq!(work.genre(), None);
        assert_eq!(work.quotes(), ["Тиха вода греблю рве."]);
        assert_eq!(work.full_text(), "");
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("ZNO".parse::<Category>().unwrap(), Category::Zno);
        assert!(matches!(
            "poetry".parse::<Category>(),
            Err(WorkError::UnknownCategory(_))
        ));
    }

    #[test]
    fn author_requires_name() {
        assert!(Author::new(AuthorId::new(1), " ").is_err());
        assert_eq!(Author::new(AuthorId::new(1), " Леся Українка ").unwrap().name(), "Леся Українка");
    }
}
