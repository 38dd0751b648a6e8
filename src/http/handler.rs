use crate::http::AppState;
use crate::models::{
    Author, AuthorDetails, AuthorName, AuthorNameError, Book, BookDetails, BookName,
    BookNameError, CreateAuthorRequest, CreateBookError, CreateBookRequest, DateError,
    DeleteAuthorError, DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, Description,
    DescriptionError, EditorialName, EditorialNameError, FindAuthorError, FindAuthorRequest,
    FindBookError, FindBookRequest, ImageUrl, ImageUrlError, Isbn, IsbnEmptyError, IsoDate,
    Progress, ProgressError, SetProgressError, SetProgressRequest, UpdateAuthorError,
    UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use crate::progress::{self, ReadingStats, ReadingStatus};
use crate::repositories::AuthorRepository;
use crate::store::{BookRecord, LoadState};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponse<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(ApiResponse::new(status, data)))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    const fn new(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    UnprocessableEntity(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        (status, Json(ApiResponse::new(status, msg))).into_response()
    }
}

impl From<ParseAuthorHttpRequestError> for ApiError {
    fn from(err: ParseAuthorHttpRequestError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl From<ParseBookHttpRequestError> for ApiError {
    fn from(err: ParseBookHttpRequestError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl From<FindAuthorError> for ApiError {
    fn from(err: FindAuthorError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<UpdateAuthorError> for ApiError {
    fn from(err: UpdateAuthorError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<DeleteAuthorError> for ApiError {
    fn from(err: DeleteAuthorError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<SetProgressError> for ApiError {
    fn from(err: SetProgressError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<CreateBookError> for ApiError {
    fn from(err: CreateBookError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<FindBookError> for ApiError {
    fn from(err: FindBookError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<UpdateBookError> for ApiError {
    fn from(err: UpdateBookError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<DeleteBookError> for ApiError {
    fn from(err: DeleteBookError) -> Self {
        Self::NotFound(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHttpRequest {
    name: String,
    birth_date: String,
    description: String,
    image: String,
}

#[derive(Error, Debug)]
pub enum ParseAuthorHttpRequestError {
    #[error(transparent)]
    Name(#[from] AuthorNameError),
    #[error(transparent)]
    BirthDate(#[from] DateError),
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error(transparent)]
    Image(#[from] ImageUrlError),
}

impl TryFrom<AuthorHttpRequest> for AuthorDetails {
    type Error = ParseAuthorHttpRequestError;

    fn try_from(value: AuthorHttpRequest) -> Result<Self, Self::Error> {
        let name = AuthorName::new(&value.name)?;
        let birth_date = IsoDate::new(&value.birth_date)?;
        let description = Description::for_author(&value.description)?;
        let image = ImageUrl::new(&value.image)?;
        Ok(Self::new(name, birth_date, description, image))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookHttpRequest {
    name: String,
    isbn: String,
    publishing_date: String,
    description: String,
    image: String,
    editorial_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookHttpRequest {
    author_id: i64,
    #[serde(flatten)]
    book: BookHttpRequest,
}

#[derive(Error, Debug)]
pub enum ParseBookHttpRequestError {
    #[error(transparent)]
    Name(#[from] BookNameError),
    #[error(transparent)]
    Isbn(#[from] IsbnEmptyError),
    #[error(transparent)]
    PublishingDate(#[from] DateError),
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error(transparent)]
    Image(#[from] ImageUrlError),
    #[error(transparent)]
    EditorialName(#[from] EditorialNameError),
}

impl TryFrom<BookHttpRequest> for BookDetails {
    type Error = ParseBookHttpRequestError;

    fn try_from(value: BookHttpRequest) -> Result<Self, Self::Error> {
        let name = BookName::new(&value.name)?;
        let isbn = Isbn::new(&value.isbn)?;
        let publishing_date = IsoDate::new(&value.publishing_date)?;
        let description = Description::for_book(&value.description)?;
        let image = ImageUrl::new(&value.image)?;
        let editorial_name = EditorialName::new(&value.editorial_name)?;
        Ok(Self::new(
            name,
            isbn,
            image,
            publishing_date,
            description,
            editorial_name,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ProgressHttpRequest {
    progress: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorHttpResponse {
    #[serde(flatten)]
    author: Author,
    reading_status: ReadingStatus,
    reading_status_label: &'static str,
}

impl From<Author> for AuthorHttpResponse {
    fn from(value: Author) -> Self {
        let status = progress::classify(value.reading_progress().value());
        Self {
            author: value,
            reading_status: status,
            reading_status_label: status.label(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStatsHttpResponse {
    #[serde(flatten)]
    stats: ReadingStats,
    average_display: String,
    total: usize,
}

impl From<ReadingStats> for ReadingStatsHttpResponse {
    fn from(value: ReadingStats) -> Self {
        Self {
            average_display: value.average_display(),
            total: value.total(),
            stats: value,
        }
    }
}

pub async fn list_authors<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
) -> ApiSuccess<Vec<AuthorHttpResponse>> {
    let snapshot = state.author_repo.find_all_authors().await;
    let authors = snapshot
        .authors()
        .iter()
        .cloned()
        .map(AuthorHttpResponse::from)
        .collect();
    ApiSuccess::new(StatusCode::OK, authors)
}

pub async fn create_author<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Json(body): Json<AuthorHttpRequest>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let req = CreateAuthorRequest::new(body.try_into()?);
    let author = state.author_repo.create_author(&req).await;
    Ok(ApiSuccess::new(StatusCode::CREATED, author.into()))
}

pub async fn find_author<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    state
        .author_repo
        .find_author(&FindAuthorRequest::new(id))
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::OK, author.into()))
}

pub async fn update_author<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
    Json(body): Json<AuthorHttpRequest>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let req = UpdateAuthorRequest::new(id, body.try_into()?);
    state
        .author_repo
        .update_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::OK, author.into()))
}

pub async fn delete_author<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .author_repo
        .delete_author(&DeleteAuthorRequest::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_progress<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
    Json(body): Json<ProgressHttpRequest>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let req = SetProgressRequest::new(id, Progress::new(body.progress)?);
    state
        .author_repo
        .set_progress(&req)
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::OK, author.into()))
}

pub async fn list_books<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
) -> ApiSuccess<Vec<BookRecord>> {
    let snapshot = state.author_repo.find_all_authors().await;
    ApiSuccess::new(StatusCode::OK, snapshot.books())
}

pub async fn create_book<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Json(body): Json<CreateBookHttpRequest>,
) -> Result<ApiSuccess<Book>, ApiError> {
    let req = CreateBookRequest::new(body.author_id, body.book.try_into()?);
    state
        .author_repo
        .create_book(&req)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::CREATED, book))
}

pub async fn find_book<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<BookRecord>, ApiError> {
    state
        .author_repo
        .find_book(&FindBookRequest::new(id))
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, book))
}

pub async fn update_book<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
    Json(body): Json<BookHttpRequest>,
) -> Result<ApiSuccess<Book>, ApiError> {
    let req = UpdateBookRequest::new(id, body.try_into()?);
    state
        .author_repo
        .update_book(&req)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, book))
}

pub async fn delete_book<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .author_repo
        .delete_book(&DeleteBookRequest::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reading_stats<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
) -> ApiSuccess<ReadingStatsHttpResponse> {
    let snapshot = state.author_repo.find_all_authors().await;
    ApiSuccess::new(StatusCode::OK, snapshot.reading_stats().into())
}

pub async fn load_status<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
) -> ApiSuccess<LoadState> {
    ApiSuccess::new(StatusCode::OK, state.author_repo.load_state().await)
}

pub async fn refresh<AR: AuthorRepository>(
    State(state): State<AppState<AR>>,
) -> ApiSuccess<LoadState> {
    ApiSuccess::new(StatusCode::OK, state.author_repo.refresh().await)
}
