use serde::{Deserialize, Serialize};

use crate::domain::types::{AuthorName, BookId, BookTitle, PublicationYear};

/// A single book record exposed by the catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: BookTitle,
    pub author: AuthorName,
    pub year: PublicationYear,
    #[serde(default)]
    pub read: bool,
}

/// Payload for registering a new book. The identifier is assigned by the server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBook {
    pub title: BookTitle,
    pub author: AuthorName,
    pub year: PublicationYear,
    #[serde(default)]
    pub read: bool,
}

impl NewBook {
    #[must_use]
    pub fn new(title: BookTitle, author: AuthorName, year: PublicationYear) -> Self {
        Self {
            title,
            author,
            year,
            read: false,
        }
    }

    /// Attach the server-assigned identifier.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            year: self.year,
            read: self.read,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<BookTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<PublicationYear>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl UpdateBook {
    /// Update that only sets the read flag.
    #[must_use]
    pub fn read(read: bool) -> Self {
        Self {
            read: Some(read),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none() && self.read.is_none()
    }
}

impl Book {
    /// Title and author as they are compared for duplicate detection.
    pub fn identity_key(&self) -> (String, String) {
        identity_key(&self.title, &self.author)
    }

    /// Returns a copy of the book with the update applied.
    #[must_use]
    pub fn with_update(&self, update: &UpdateBook) -> Self {
        Self {
            id: self.id,
            title: update.title.clone().unwrap_or_else(|| self.title.clone()),
            author: update.author.clone().unwrap_or_else(|| self.author.clone()),
            year: update.year.unwrap_or(self.year),
            read: update.read.unwrap_or(self.read),
        }
    }
}

/// Case-insensitive key over trimmed title and author.
pub fn identity_key(title: &BookTitle, author: &AuthorName) -> (String, String) {
    (
        title.as_str().trim().to_lowercase(),
        author.as_str().trim().to_lowercase(),
    )
}
