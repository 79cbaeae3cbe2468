//! Forms for creating and editing catalog books.

use serde::Deserialize;
use validator::Validate;

use crate::domain::book::{NewBook, UpdateBook};
use crate::domain::types::{
    AuthorName, BookTitle, MAX_PUBLICATION_YEAR, MIN_PUBLICATION_YEAR, PublicationYear,
};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// JSON body accepted when registering a book.
pub struct CreateBookForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(range(min = MIN_PUBLICATION_YEAR, max = MAX_PUBLICATION_YEAR))]
    pub year: i32,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
/// JSON body accepted when editing a book. Absent fields stay unchanged.
pub struct UpdateBookForm {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
    #[validate(range(min = MIN_PUBLICATION_YEAR, max = MAX_PUBLICATION_YEAR))]
    pub year: Option<i32>,
    pub read: Option<bool>,
}

impl TryFrom<CreateBookForm> for NewBook {
    type Error = FormError;

    fn try_from(form: CreateBookForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(NewBook {
            title: BookTitle::new(form.title).map_err(|_| FormError::InvalidTitle)?,
            author: AuthorName::new(form.author).map_err(|_| FormError::InvalidAuthor)?,
            year: PublicationYear::new(form.year).map_err(|_| FormError::InvalidYear)?,
            read: form.read,
        })
    }
}

impl TryFrom<UpdateBookForm> for UpdateBook {
    type Error = FormError;

    fn try_from(form: UpdateBookForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(UpdateBook {
            title: form
                .title
                .map(BookTitle::new)
                .transpose()
                .map_err(|_| FormError::InvalidTitle)?,
            author: form
                .author
                .map(AuthorName::new)
                .transpose()
                .map_err(|_| FormError::InvalidAuthor)?,
            year: form
                .year
                .map(PublicationYear::new)
                .transpose()
                .map_err(|_| FormError::InvalidYear)?,
            read: form.read,
        })
    }
}
