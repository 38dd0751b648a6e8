use crate::models::{
    Author, AuthorDetails, Book, BookDetails, BookName, Description, Editorial, EditorialName,
    ImageUrl, Isbn, IsoDate, Prize, Progress,
};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[async_trait]
pub trait AuthorSource: Send + Sync + 'static {
    async fn fetch_authors(&self) -> Result<Vec<Author>, FetchAuthorsError>;
}

#[derive(Error, Debug)]
pub enum FetchAuthorsError {
    #[error("HTTP error status: {0}")]
    Status(u16),
    #[error("Failed to fetch authors: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to decode authors: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Reads authors from `GET {base_url}/authors`.
#[derive(Debug, Clone)]
pub struct HttpAuthorSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthorSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').into(),
        }
    }
}

#[async_trait]
impl AuthorSource for HttpAuthorSource {
    async fn fetch_authors(&self) -> Result<Vec<Author>, FetchAuthorsError> {
        let url = format!("{}/authors", self.base_url);
        debug!(%url, "Fetching authors");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchAuthorsError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchAuthorsError::Status(status.as_u16()));
        }

        let payload: Vec<AuthorPayload> =
            response.json().await.map_err(FetchAuthorsError::Decode)?;

        Ok(payload.into_iter().map(Author::from).collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorPayload {
    id: i64,
    name: String,
    #[serde(default)]
    birth_date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    books: Vec<BookPayload>,
    #[serde(default)]
    prizes: Vec<PrizePayload>,
    #[serde(default)]
    reading_progress: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookPayload {
    id: i64,
    name: String,
    #[serde(default)]
    isbn: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    publishing_date: String,
    #[serde(default)]
    description: String,
    editorial: EditorialPayload,
}

#[derive(Debug, Deserialize)]
struct EditorialPayload {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrizePayload {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    premiation_date: Option<String>,
}

// Remote data is trusted as-is, the same way stored rows would be.
impl From<AuthorPayload> for Author {
    fn from(value: AuthorPayload) -> Self {
        let details = AuthorDetails::new_unchecked(
            &value.name,
            &value.birth_date,
            &value.description,
            &value.image,
        );
        let books = value.books.into_iter().map(Book::from).collect();
        let prizes = value
            .prizes
            .into_iter()
            .map(|prize| Prize::new(prize.id, prize.name, prize.description, prize.premiation_date))
            .collect();
        let progress = Progress::new_unchecked(value.reading_progress.unwrap_or(0));

        Self::new(value.id, details, books, prizes, progress)
    }
}

impl From<BookPayload> for Book {
    fn from(value: BookPayload) -> Self {
        let details = BookDetails::new(
            BookName::new_unchecked(&value.name),
            Isbn::new_unchecked(&value.isbn),
            ImageUrl::new_unchecked(&value.image),
            IsoDate::new_unchecked(&value.publishing_date),
            Description::new_unchecked(&value.description),
            EditorialName::new_unchecked(&value.editorial.name),
        );
        let editorial = Editorial::new(
            value.editorial.id,
            EditorialName::new_unchecked(&value.editorial.name),
        );
        Self::new(value.id, details, editorial)
    }
}
