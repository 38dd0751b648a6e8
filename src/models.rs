use chrono::NaiveDate;
use regex::Regex;
use reqwest::Url;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

const AUTHOR_NAME_MAX: usize = 100;
const BOOK_NAME_MAX: usize = 200;
const EDITORIAL_NAME_MAX: usize = 100;
const AUTHOR_DESCRIPTION_MAX: usize = 2000;
const BOOK_DESCRIPTION_MAX: usize = 1000;

enum Length {
    Empty,
    TooLong,
}

fn check_length(raw: &str, max: usize) -> Result<&str, Length> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(Length::Empty)
    } else if trimmed.chars().count() > max {
        Err(Length::TooLong)
    } else {
        Ok(trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameError> {
        match check_length(raw, AUTHOR_NAME_MAX) {
            Ok(name) => Ok(Self(name.into())),
            Err(Length::Empty) => Err(AuthorNameError::Empty),
            Err(Length::TooLong) => Err(AuthorNameError::TooLong),
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthorNameError {
    #[error("El nombre es requerido")]
    Empty,
    #[error("El nombre es muy largo")]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BookName(String);

impl BookName {
    pub fn new(raw: &str) -> Result<Self, BookNameError> {
        match check_length(raw, BOOK_NAME_MAX) {
            Ok(name) => Ok(Self(name.into())),
            Err(Length::Empty) => Err(BookNameError::Empty),
            Err(Length::TooLong) => Err(BookNameError::TooLong),
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for BookName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BookNameError {
    #[error("El nombre es requerido")]
    Empty,
    #[error("El nombre es muy largo")]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    pub fn for_author(raw: &str) -> Result<Self, DescriptionError> {
        Self::bounded(raw, AUTHOR_DESCRIPTION_MAX)
    }

    pub fn for_book(raw: &str) -> Result<Self, DescriptionError> {
        Self::bounded(raw, BOOK_DESCRIPTION_MAX)
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    fn bounded(raw: &str, max: usize) -> Result<Self, DescriptionError> {
        match check_length(raw, max) {
            Ok(description) => Ok(Self(description.into())),
            Err(Length::Empty) => Err(DescriptionError::Empty),
            Err(Length::TooLong) => Err(DescriptionError::TooLong),
        }
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("La descripción es requerida")]
    Empty,
    #[error("La descripción es muy larga")]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditorialName(String);

impl EditorialName {
    pub fn new(raw: &str) -> Result<Self, EditorialNameError> {
        match check_length(raw, EDITORIAL_NAME_MAX) {
            Ok(name) => Ok(Self(name.into())),
            Err(Length::Empty) => Err(EditorialNameError::Empty),
            Err(Length::TooLong) => Err(EditorialNameError::TooLong),
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for EditorialName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorialNameError {
    #[error("El nombre de la editorial es requerido")]
    Empty,
    #[error("El nombre de la editorial es muy largo")]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    pub fn new(raw: &str) -> Result<Self, IsbnEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(IsbnEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for Isbn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("El ISBN es requerido")]
pub struct IsbnEmptyError;

/// Calendar date kept in its `YYYY-MM-DD` wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IsoDate(String);

impl IsoDate {
    pub fn new(raw: &str) -> Result<Self, DateError> {
        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DateError::Missing);
        }
        if !RE.is_match(trimmed) {
            return Err(DateError::Format);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| DateError::Invalid)?;

        Ok(Self(trimmed.into()))
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for IsoDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateError {
    #[error("La fecha es requerida")]
    Missing,
    #[error("Formato de fecha inválido (debe ser YYYY-MM-DD)")]
    Format,
    #[error("Fecha inválida")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(raw: &str) -> Result<Self, ImageUrlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(ImageUrlError::Missing)
        } else if Self::is_valid(trimmed) {
            Ok(Self(trimmed.into()))
        } else {
            Err(ImageUrlError::Invalid(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    fn is_valid(s: &str) -> bool {
        Url::parse(s).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}

impl std::fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageUrlError {
    #[error("La URL de imagen es requerida")]
    Missing,
    #[error("Debe ser una URL válida")]
    Invalid(String),
}

/// Reading progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Progress(i32);

impl Progress {
    pub const MAX: i32 = 100;

    pub const fn new(raw: i32) -> Result<Self, ProgressError> {
        if raw < 0 || raw > Self::MAX {
            Err(ProgressError(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Accepts any value, including ones outside `0..=100`.
    pub const fn new_unchecked(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("El progreso debe estar entre 0 y 100")]
pub struct ProgressError(i32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Editorial {
    id: i64,
    name: EditorialName,
}

impl Editorial {
    pub const fn new(id: i64, name: EditorialName) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &EditorialName {
        &self.name
    }
}

/// Award held by an author. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    id: i64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    premiation_date: Option<String>,
}

impl Prize {
    pub const fn new(
        id: i64,
        name: String,
        description: Option<String>,
        premiation_date: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            premiation_date,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    id: i64,
    name: BookName,
    isbn: Isbn,
    image: ImageUrl,
    publishing_date: IsoDate,
    description: Description,
    editorial: Editorial,
}

impl Book {
    pub fn new(id: i64, details: BookDetails, editorial: Editorial) -> Self {
        Self {
            id,
            name: details.name,
            isbn: details.isbn,
            image: details.image,
            publishing_date: details.publishing_date,
            description: details.description,
            editorial,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &BookName {
        &self.name
    }

    pub const fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub const fn image(&self) -> &ImageUrl {
        &self.image
    }

    pub const fn publishing_date(&self) -> &IsoDate {
        &self.publishing_date
    }

    pub const fn description(&self) -> &Description {
        &self.description
    }

    pub const fn editorial(&self) -> &Editorial {
        &self.editorial
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    id: i64,
    name: AuthorName,
    birth_date: IsoDate,
    description: Description,
    image: ImageUrl,
    books: Vec<Book>,
    prizes: Vec<Prize>,
    reading_progress: Progress,
}

impl Author {
    pub fn new(
        id: i64,
        details: AuthorDetails,
        books: Vec<Book>,
        prizes: Vec<Prize>,
        reading_progress: Progress,
    ) -> Self {
        Self {
            id,
            name: details.name,
            birth_date: details.birth_date,
            description: details.description,
            image: details.image,
            books,
            prizes,
            reading_progress,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub const fn birth_date(&self) -> &IsoDate {
        &self.birth_date
    }

    pub const fn description(&self) -> &Description {
        &self.description
    }

    pub const fn image(&self) -> &ImageUrl {
        &self.image
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub const fn reading_progress(&self) -> Progress {
        self.reading_progress
    }

    pub(crate) fn set_details(&mut self, details: AuthorDetails) {
        self.name = details.name;
        self.birth_date = details.birth_date;
        self.description = details.description;
        self.image = details.image;
    }

    pub(crate) fn set_reading_progress(&mut self, progress: Progress) {
        self.reading_progress = progress;
    }

    pub(crate) fn books_mut(&mut self) -> &mut Vec<Book> {
        &mut self.books
    }
}

/// Editable fields of an author.
#[derive(Debug, Clone)]
pub struct AuthorDetails {
    name: AuthorName,
    birth_date: IsoDate,
    description: Description,
    image: ImageUrl,
}

impl AuthorDetails {
    pub const fn new(
        name: AuthorName,
        birth_date: IsoDate,
        description: Description,
        image: ImageUrl,
    ) -> Self {
        Self {
            name,
            birth_date,
            description,
            image,
        }
    }

    pub fn new_unchecked(name: &str, birth_date: &str, description: &str, image: &str) -> Self {
        Self::new(
            AuthorName::new_unchecked(name),
            IsoDate::new_unchecked(birth_date),
            Description::new_unchecked(description),
            ImageUrl::new_unchecked(image),
        )
    }
}

/// Editable fields of a book. The editorial is referenced by name; the store
/// resolves its id.
#[derive(Debug, Clone)]
pub struct BookDetails {
    name: BookName,
    isbn: Isbn,
    image: ImageUrl,
    publishing_date: IsoDate,
    description: Description,
    editorial_name: EditorialName,
}

impl BookDetails {
    pub const fn new(
        name: BookName,
        isbn: Isbn,
        image: ImageUrl,
        publishing_date: IsoDate,
        description: Description,
        editorial_name: EditorialName,
    ) -> Self {
        Self {
            name,
            isbn,
            image,
            publishing_date,
            description,
            editorial_name,
        }
    }

    pub const fn editorial_name(&self) -> &EditorialName {
        &self.editorial_name
    }
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    details: AuthorDetails,
}

impl CreateAuthorRequest {
    pub const fn new(details: AuthorDetails) -> Self {
        Self { details }
    }

    pub const fn details(&self) -> &AuthorDetails {
        &self.details
    }
}

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: i64,
}

impl FindAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct UpdateAuthorRequest {
    id: i64,
    details: AuthorDetails,
}

impl UpdateAuthorRequest {
    pub const fn new(id: i64, details: AuthorDetails) -> Self {
        Self { id, details }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn details(&self) -> &AuthorDetails {
        &self.details
    }
}

#[derive(Error, Debug)]
pub enum UpdateAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct DeleteAuthorRequest {
    id: i64,
}

impl DeleteAuthorRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct SetProgressRequest {
    author_id: i64,
    progress: Progress,
}

impl SetProgressRequest {
    pub const fn new(author_id: i64, progress: Progress) -> Self {
        Self {
            author_id,
            progress,
        }
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub const fn progress(&self) -> Progress {
        self.progress
    }
}

#[derive(Error, Debug)]
pub enum SetProgressError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct CreateBookRequest {
    author_id: i64,
    details: BookDetails,
}

impl CreateBookRequest {
    pub const fn new(author_id: i64, details: BookDetails) -> Self {
        Self { author_id, details }
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub const fn details(&self) -> &BookDetails {
        &self.details
    }
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error("Author with id \"{id}\" does not exist")]
    AuthorNotFound { id: i64 },
}

#[derive(Debug)]
pub struct FindBookRequest {
    id: i64,
}

impl FindBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct UpdateBookRequest {
    id: i64,
    details: BookDetails,
}

impl UpdateBookRequest {
    pub const fn new(id: i64, details: BookDetails) -> Self {
        Self { id, details }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn details(&self) -> &BookDetails {
        &self.details
    }
}

#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: i64,
}

impl DeleteBookRequest {
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_name_is_trimmed() {
        let name = AuthorName::new("  Isabel Allende ").unwrap();
        assert_eq!(name.to_string(), "Isabel Allende");
    }

    #[test]
    fn author_name_rejects_blank_and_long() {
        assert_eq!(AuthorName::new("   "), Err(AuthorNameError::Empty));
        assert_eq!(AuthorName::new(&"a".repeat(101)), Err(AuthorNameError::TooLong));
        assert!(AuthorName::new(&"ñ".repeat(100)).is_ok());
    }

    #[test]
    fn book_name_allows_two_hundred_chars() {
        assert!(BookName::new(&"b".repeat(200)).is_ok());
        assert_eq!(BookName::new(&"b".repeat(201)), Err(BookNameError::TooLong));
    }

    #[test]
    fn description_limits_depend_on_owner() {
        let text = "d".repeat(1500);
        assert!(Description::for_author(&text).is_ok());
        assert_eq!(Description::for_book(&text), Err(DescriptionError::TooLong));
        assert_eq!(Description::for_book(""), Err(DescriptionError::Empty));
    }

    #[test]
    fn editorial_name_and_isbn() {
        assert_eq!(EditorialName::new(""), Err(EditorialNameError::Empty));
        assert_eq!(
            EditorialName::new(&"e".repeat(101)),
            Err(EditorialNameError::TooLong)
        );
        assert_eq!(Isbn::new(" "), Err(IsbnEmptyError));
        assert_eq!(Isbn::new("978-0307474728").unwrap().to_string(), "978-0307474728");
    }

    #[test]
    fn dates() {
        assert_eq!(IsoDate::new("1927-03-06").unwrap().to_string(), "1927-03-06");
        assert_eq!(IsoDate::new(""), Err(DateError::Missing));
        assert_eq!(IsoDate::new("06/03/1927"), Err(DateError::Format));
        assert_eq!(IsoDate::new("1927-3-6"), Err(DateError::Format));
        assert_eq!(IsoDate::new("1927-02-30"), Err(DateError::Invalid));
        assert_eq!(IsoDate::new("1927-13-01"), Err(DateError::Invalid));
    }

    #[test]
    fn image_urls() {
        assert!(ImageUrl::new("https://example.com/ggm.jpg").is_ok());
        assert!(ImageUrl::new("http://127.0.0.1:8080/img/a.png").is_ok());
        assert_eq!(ImageUrl::new(""), Err(ImageUrlError::Missing));
        assert!(matches!(
            ImageUrl::new("not a url"),
            Err(ImageUrlError::Invalid(_))
        ));
        assert!(matches!(
            ImageUrl::new("ftp://example.com/a.jpg"),
            Err(ImageUrlError::Invalid(_))
        ));
    }

    #[test]
    fn image_urls_follow_url_parsing() {
        for valid in [
            "https://example.com?w=400",
            "https://my_cdn.example.com/a.jpg",
            "http://[::1]/a.png",
            "https://user@example.com/a.jpg",
        ] {
            assert!(ImageUrl::new(valid).is_ok(), "{valid}");
        }
        assert!(matches!(
            ImageUrl::new("https://example.com:99999/a.jpg"),
            Err(ImageUrlError::Invalid(_))
        ));
    }

    #[test]
    fn progress_range() {
        assert_eq!(Progress::new(0).unwrap().value(), 0);
        assert_eq!(Progress::new(100).unwrap().value(), 100);
        assert_eq!(Progress::new(101), Err(ProgressError(101)));
        assert_eq!(Progress::new(-1), Err(ProgressError(-1)));
        assert_eq!(
            ProgressError(101).to_string(),
            "El progreso debe estar entre 0 y 100"
        );
        assert_eq!(Progress::new_unchecked(250).value(), 250);
    }

    #[test]
    fn author_serializes_camel_case() {
        let details = AuthorDetails::new_unchecked(
            "Jorge Luis Borges",
            "1899-08-24",
            "Argentine short-story writer",
            "https://example.com/jlb.jpg",
        );
        let author = Author::new(3, details, Vec::new(), Vec::new(), Progress::new_unchecked(100));
        let json = serde_json::to_value(&author).unwrap();
        assert_eq!(json["birthDate"], "1899-08-24");
        assert_eq!(json["readingProgress"], 100);
        assert_eq!(json["books"], serde_json::json!([]));
    }
}
