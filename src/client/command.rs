//! User intents understood by the browse session.

use std::str::FromStr;

use crate::domain::book::NewBook;
use crate::domain::query::{SortKey, SortOrder};
use crate::domain::types::{AuthorName, BookId, BookTitle, PublicationYear};

/// One user action against the catalog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw search input; committed after the debounce window.
    Search(String),
    SortBy(SortKey),
    Order(SortOrder),
    Page(usize),
    NextPage,
    PreviousPage,
    /// Refetch the current page without changing the query.
    Reload,
    Create(NewBook),
    ToggleRead(BookId),
    Delete(BookId),
}

fn parse_id(raw: &str) -> Result<BookId, String> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a book id", raw.trim()))?;
    BookId::new(value).map_err(|e| e.to_string())
}

fn parse_new_book(raw: &str) -> Result<NewBook, String> {
    let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
    let [title, author, year] = parts.as_slice() else {
        return Err("expected `add title; author; year`".to_string());
    };
    let year: i32 = year
        .parse()
        .map_err(|_| format!("`{year}` is not a year"))?;

    Ok(NewBook::new(
        BookTitle::new(*title).map_err(|e| format!("title: {e}"))?,
        AuthorName::new(*author).map_err(|e| format!("author: {e}"))?,
        PublicationYear::new(year).map_err(|e| format!("year: {e}"))?,
    ))
}

impl FromStr for Command {
    type Err = String;

    /// Parses a line of the `browse` prompt. A leading `/` starts a search;
    /// everything else is `verb [argument]`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if let Some(text) = line.strip_prefix('/') {
            return Ok(Command::Search(text.to_string()));
        }

        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match verb {
            "sort" => rest.parse().map(Command::SortBy).map_err(|e| e.to_string()),
            "order" => rest.parse().map(Command::Order).map_err(|e| e.to_string()),
            "page" => rest
                .parse()
                .map(Command::Page)
                .map_err(|_| format!("`{rest}` is not a page number")),
            "next" => Ok(Command::NextPage),
            "prev" => Ok(Command::PreviousPage),
            "reload" => Ok(Command::Reload),
            "add" => parse_new_book(rest).map(Command::Create),
            "toggle" => parse_id(rest).map(Command::ToggleRead),
            "delete" => parse_id(rest).map(Command::Delete),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}
