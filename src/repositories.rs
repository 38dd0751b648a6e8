use crate::models::{
    Author, Book, CreateAuthorRequest, CreateBookError, CreateBookRequest, DeleteAuthorError,
    DeleteAuthorRequest, DeleteBookError, DeleteBookRequest, FindAuthorError, FindAuthorRequest,
    FindBookError, FindBookRequest, SetProgressError, SetProgressRequest, UpdateAuthorError,
    UpdateAuthorRequest, UpdateBookError, UpdateBookRequest,
};
use crate::remote::AuthorSource;
use crate::store::{AuthorStore, BookRecord, LoadState, Snapshot};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Author;

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    async fn find_all_authors(&self) -> Snapshot;

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError>;

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError>;

    async fn set_progress(&self, req: &SetProgressRequest) -> Result<Author, SetProgressError>;

    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_book(&self, req: &FindBookRequest) -> Result<BookRecord, FindBookError>;

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError>;

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError>;

    async fn load_state(&self) -> LoadState;

    async fn refresh(&self) -> LoadState;
}

/// Repository over the in-memory store, refreshed from a remote source.
#[derive(Debug)]
pub struct DefaultAuthorRepository<S> {
    store: AuthorStore,
    source: S,
}

impl<S: AuthorSource> DefaultAuthorRepository<S> {
    #[must_use]
    pub const fn new(store: AuthorStore, source: S) -> Self {
        Self { store, source }
    }
}

#[async_trait]
impl<S: AuthorSource> AuthorRepository for DefaultAuthorRepository<S> {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Author {
        self.store.add_author(req.details()).value
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        self.store
            .snapshot()
            .find_author(req.id())
            .cloned()
            .ok_or(FindAuthorError::NotFound { id: req.id() })
    }

    async fn find_all_authors(&self) -> Snapshot {
        self.store.snapshot()
    }

    async fn update_author(&self, req: &UpdateAuthorRequest) -> Result<Author, UpdateAuthorError> {
        let updated = self.store.update_author(req.id(), req.details())?;
        Ok(updated.value)
    }

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError> {
        self.store.delete_author(req.id())?;
        Ok(())
    }

    async fn set_progress(&self, req: &SetProgressRequest) -> Result<Author, SetProgressError> {
        let updated = self.store.set_progress(req.author_id(), req.progress())?;
        Ok(updated.value)
    }

    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let updated = self.store.add_book(req.author_id(), req.details())?;
        Ok(updated.value)
    }

    async fn find_book(&self, req: &FindBookRequest) -> Result<BookRecord, FindBookError> {
        self.store
            .snapshot()
            .find_book(req.id())
            .ok_or(FindBookError::NotFound { id: req.id() })
    }

    async fn update_book(&self, req: &UpdateBookRequest) -> Result<Book, UpdateBookError> {
        let updated = self.store.update_book(req.id(), req.details())?;
        Ok(updated.value)
    }

    async fn delete_book(&self, req: &DeleteBookRequest) -> Result<(), DeleteBookError> {
        self.store.delete_book(req.id())?;
        Ok(())
    }

    async fn load_state(&self) -> LoadState {
        self.store.load_state()
    }

    async fn refresh(&self) -> LoadState {
        self.store.refresh(&self.source).await
    }
}
