use crate::models::{
    Author, AuthorDetails, AuthorName, Book, BookDetails, CreateBookError, DeleteAuthorError,
    DeleteBookError, Editorial, EditorialName, Progress, SetProgressError, UpdateAuthorError,
    UpdateBookError,
};
use crate::progress::{self, ReadingStats};
use crate::remote::AuthorSource;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    authors: Arc<[Author]>,
}

impl Snapshot {
    pub fn new(authors: Vec<Author>) -> Self {
        Self {
            authors: authors.into(),
        }
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn find_author(&self, id: i64) -> Option<&Author> {
        self.authors.iter().find(|author| author.id() == id)
    }

    pub fn find_book(&self, id: i64) -> Option<BookRecord> {
        self.authors.iter().find_map(|author| {
            author
                .books()
                .iter()
                .find(|book| book.id() == id)
                .map(|book| BookRecord::new(author, book))
        })
    }

    /// Every book paired with its owner, in author order then book order.
    pub fn books(&self) -> Vec<BookRecord> {
        self.authors
            .iter()
            .flat_map(|author| {
                author
                    .books()
                    .iter()
                    .map(move |book| BookRecord::new(author, book))
            })
            .collect()
    }

    pub fn reading_stats(&self) -> ReadingStats {
        progress::aggregate(&self.authors)
    }
}

/// A book as seen from the flattened book list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    author_id: i64,
    author_name: AuthorName,
    #[serde(flatten)]
    book: Book,
}

impl BookRecord {
    fn new(author: &Author, book: &Book) -> Self {
        Self {
            author_id: author.id(),
            author_name: author.name().clone(),
            book: book.clone(),
        }
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }

    pub const fn author_name(&self) -> &AuthorName {
        &self.author_name
    }
}

/// Outcome of the most recent fetch from the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Result of a mutation: the snapshot it produced and the entity it touched.
#[derive(Debug, Clone)]
pub struct Updated<T> {
    pub snapshot: Snapshot,
    pub value: T,
}

#[derive(Debug)]
struct State {
    snapshot: Snapshot,
    load: LoadState,
    refreshes: usize,
}

#[derive(Debug, Clone)]
pub struct AuthorStore {
    state: Arc<RwLock<State>>,
}

impl Default for AuthorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorStore {
    /// Empty store awaiting its first refresh; it reports `loading` until then.
    pub fn new() -> Self {
        Self::from_state(Snapshot::default(), true)
    }

    pub fn with_authors(authors: Vec<Author>) -> Self {
        Self::from_state(Snapshot::new(authors), false)
    }

    fn from_state(snapshot: Snapshot, loading: bool) -> Self {
        let state = State {
            snapshot,
            load: LoadState {
                loading,
                error: None,
            },
            refreshes: 0,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read(|state| state.snapshot.clone())
    }

    pub fn load_state(&self) -> LoadState {
        self.read(|state| state.load.clone())
    }

    pub fn replace_all(&self, authors: Vec<Author>) -> Snapshot {
        let snapshot = Snapshot::new(authors);
        self.write().snapshot = snapshot.clone();
        snapshot
    }

    pub fn add_author(&self, details: &AuthorDetails) -> Updated<Author> {
        let Ok(updated) = self.mutate(|authors| {
            let id = next_author_id(authors);
            let author = Author::new(
                id,
                details.clone(),
                Vec::new(),
                Vec::new(),
                Progress::default(),
            );
            authors.push(author.clone());
            Ok::<_, Infallible>(author)
        });
        debug!(id = updated.value.id(), "Added author");
        updated
    }

    /// Replaces the editable fields; books, prizes and progress are kept.
    pub fn update_author(
        &self,
        id: i64,
        details: &AuthorDetails,
    ) -> Result<Updated<Author>, UpdateAuthorError> {
        self.mutate(|authors| {
            let author = authors
                .iter_mut()
                .find(|author| author.id() == id)
                .ok_or(UpdateAuthorError::NotFound { id })?;
            author.set_details(details.clone());
            debug!(id, "Updated author");
            Ok(author.clone())
        })
    }

    pub fn delete_author(&self, id: i64) -> Result<Snapshot, DeleteAuthorError> {
        self.mutate(|authors| {
            let index = authors
                .iter()
                .position(|author| author.id() == id)
                .ok_or(DeleteAuthorError::NotFound { id })?;
            authors.remove(index);
            debug!(id, "Deleted author");
            Ok(())
        })
        .map(|updated| updated.snapshot)
    }

    pub fn set_progress(
        &self,
        author_id: i64,
        progress: Progress,
    ) -> Result<Updated<Author>, SetProgressError> {
        self.mutate(|authors| {
            let author = authors
                .iter_mut()
                .find(|author| author.id() == author_id)
                .ok_or(SetProgressError::NotFound { id: author_id })?;
            author.set_reading_progress(progress);
            debug!(author_id, progress = progress.value(), "Set reading progress");
            Ok(author.clone())
        })
    }

    pub fn add_book(
        &self,
        author_id: i64,
        details: &BookDetails,
    ) -> Result<Updated<Book>, CreateBookError> {
        self.mutate(|authors| {
            let id = next_book_id(authors);
            let editorial = resolve_editorial(authors, details.editorial_name());
            let author = authors
                .iter_mut()
                .find(|author| author.id() == author_id)
                .ok_or(CreateBookError::AuthorNotFound { id: author_id })?;
            let book = Book::new(id, details.clone(), editorial);
            author.books_mut().push(book.clone());
            debug!(id, author_id, "Added book");
            Ok(book)
        })
    }

    /// Replaces a book in place. It keeps its id, its owner and its
    /// editorial id; only the editorial name changes.
    pub fn update_book(
        &self,
        id: i64,
        details: &BookDetails,
    ) -> Result<Updated<Book>, UpdateBookError> {
        self.mutate(|authors| {
            let book = authors
                .iter_mut()
                .flat_map(|author| author.books_mut().iter_mut())
                .find(|book| book.id() == id)
                .ok_or(UpdateBookError::NotFound { id })?;
            let editorial = Editorial::new(book.editorial().id(), details.editorial_name().clone());
            *book = Book::new(id, details.clone(), editorial);
            debug!(id, "Updated book");
            Ok(book.clone())
        })
    }

    pub fn delete_book(&self, id: i64) -> Result<Snapshot, DeleteBookError> {
        self.mutate(|authors| {
            for author in authors.iter_mut() {
                let books = author.books_mut();
                if let Some(index) = books.iter().position(|book| book.id() == id) {
                    books.remove(index);
                    debug!(id, "Deleted book");
                    return Ok(());
                }
            }
            Err(DeleteBookError::NotFound { id })
        })
        .map(|updated| updated.snapshot)
    }

    /// Reloads the collection from `source`.
    ///
    /// On failure the current authors are kept and the error message is
    /// recorded in the load state until the next refresh. `loading` stays set
    /// while any refresh is still running.
    pub async fn refresh<S: AuthorSource + ?Sized>(&self, source: &S) -> LoadState {
        {
            let mut state = self.write();
            state.refreshes += 1;
            state.load.loading = true;
            state.load.error = None;
        }

        let result = source.fetch_authors().await;

        let mut state = self.write();
        match result {
            Ok(authors) => {
                info!(count = authors.len(), "Fetched authors");
                state.snapshot = Snapshot::new(authors);
            }
            Err(err) => {
                warn!(error = %err, "Error fetching authors");
                state.load.error = Some(err.to_string());
            }
        }
        state.refreshes -= 1;
        state.load.loading = state.refreshes > 0;
        state.load.clone()
    }

    fn mutate<T, E>(
        &self,
        f: impl FnOnce(&mut Vec<Author>) -> Result<T, E>,
    ) -> Result<Updated<T>, E> {
        let mut state = self.write();
        let mut authors = state.snapshot.authors().to_vec();
        let value = f(&mut authors)?;
        let snapshot = Snapshot::new(authors);
        state.snapshot = snapshot.clone();
        Ok(Updated { snapshot, value })
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_author_id(authors: &[Author]) -> i64 {
    fresh_id(authors.iter().map(Author::id))
}

fn next_book_id(authors: &[Author]) -> i64 {
    fresh_id(authors.iter().flat_map(Author::books).map(Book::id))
}

/// One past the largest id. Once that would overflow, the lowest unused
/// positive id.
fn fresh_id(ids: impl Iterator<Item = i64>) -> i64 {
    let ids: Vec<i64> = ids.collect();
    let Some(max) = ids.iter().copied().max() else {
        return 1;
    };
    max.checked_add(1)
        .or_else(|| (1..i64::MAX).find(|id| !ids.contains(id)))
        .unwrap_or(i64::MAX)
}

fn resolve_editorial(authors: &[Author], name: &EditorialName) -> Editorial {
    let editorials = || authors.iter().flat_map(Author::books).map(Book::editorial);
    if let Some(existing) = editorials().find(|editorial| editorial.name() == name) {
        return existing.clone();
    }
    Editorial::new(fresh_id(editorials().map(Editorial::id)), name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookName, Description, ImageUrl, Isbn, IsoDate, Prize};
    use crate::remote::FetchAuthorsError;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn details(name: &str) -> AuthorDetails {
        AuthorDetails::new_unchecked(name, "1927-03-06", "Novelist", "https://example.com/a.jpg")
    }

    fn book_details(name: &str, editorial: &str) -> BookDetails {
        BookDetails::new(
            BookName::new_unchecked(name),
            Isbn::new_unchecked("978-0307474728"),
            ImageUrl::new_unchecked("https://example.com/b.jpg"),
            IsoDate::new_unchecked("1967-05-30"),
            Description::new_unchecked("A novel"),
            EditorialName::new_unchecked(editorial),
        )
    }

    fn seeded() -> AuthorStore {
        let ggm = Author::new(
            1,
            details("Gabriel García Márquez"),
            vec![Book::new(
                101,
                book_details("Cien años de soledad", "Editorial Sudamericana"),
                Editorial::new(7, EditorialName::new_unchecked("Editorial Sudamericana")),
            )],
            vec![Prize::new(1, "Nobel".into(), None, Some("1982-10-21".into()))],
            Progress::new_unchecked(0),
        );
        let allende = Author::new(
            2,
            details("Isabel Allende"),
            Vec::new(),
            Vec::new(),
            Progress::new_unchecked(50),
        );
        let borges = Author::new(
            3,
            details("Jorge Luis Borges"),
            Vec::new(),
            Vec::new(),
            Progress::new_unchecked(100),
        );
        AuthorStore::with_authors(vec![ggm, allende, borges])
    }

    #[test]
    fn set_progress_preserves_other_fields() {
        let store = seeded();
        let before = store.snapshot().find_author(1).cloned().unwrap();

        let updated = store.set_progress(1, Progress::new(45).unwrap()).unwrap();

        assert_eq!(updated.value.reading_progress().value(), 45);
        assert_eq!(updated.value.name(), before.name());
        assert_eq!(updated.value.books(), before.books());
        assert_eq!(updated.value.prizes(), before.prizes());
        assert_eq!(progress::classify(45), progress::ReadingStatus::InProgress);
    }

    #[test]
    fn stats_follow_progress_updates() {
        let store = seeded();
        let stats = store.snapshot().reading_stats();
        assert_eq!(stats.average, 50.0);
        assert_eq!((stats.sin_iniciar, stats.en_curso, stats.completado), (1, 1, 1));

        store.set_progress(1, Progress::new(75).unwrap()).unwrap();
        let updated = store.set_progress(2, Progress::new(100).unwrap()).unwrap();

        let stats = updated.snapshot.reading_stats();
        assert_eq!(stats.average_display(), "91.7%");
        assert_eq!((stats.sin_iniciar, stats.en_curso, stats.completado), (0, 1, 2));
        assert_eq!(stats, store.snapshot().reading_stats());
    }

    #[test]
    fn old_snapshots_are_unchanged() {
        let store = seeded();
        let before = store.snapshot();

        store.set_progress(3, Progress::new(10).unwrap()).unwrap();
        store.delete_author(2).unwrap();

        assert_eq!(before.len(), 3);
        assert_eq!(before.find_author(3).unwrap().reading_progress().value(), 100);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn set_progress_on_missing_author() {
        let store = seeded();
        let err = store.set_progress(99, Progress::default()).unwrap_err();
        assert!(matches!(err, SetProgressError::NotFound { id: 99 }));
    }

    #[test]
    fn add_author_starts_empty_and_unread() {
        let store = seeded();
        let added = store.add_author(&details("Julio Cortázar")).value;

        assert_eq!(added.id(), 4);
        assert!(added.books().is_empty());
        assert!(added.prizes().is_empty());
        assert_eq!(added.reading_progress().value(), 0);
        assert_eq!(store.snapshot().authors().last().unwrap().id(), 4);
    }

    #[test]
    fn first_author_gets_id_one() {
        let store = AuthorStore::new();
        assert_eq!(store.add_author(&details("Clarice Lispector")).value.id(), 1);
    }

    #[test]
    fn update_author_keeps_books_and_progress() {
        let store = seeded();
        let updated = store.update_author(1, &details("Gabo")).unwrap().value;

        assert_eq!(updated.name().to_string(), "Gabo");
        assert_eq!(updated.books().len(), 1);
        assert_eq!(updated.prizes().len(), 1);
        assert!(matches!(
            store.update_author(42, &details("Nobody")),
            Err(UpdateAuthorError::NotFound { id: 42 })
        ));
    }

    #[test]
    fn deleting_author_drops_its_books() {
        let store = seeded();
        assert_eq!(store.snapshot().books().len(), 1);

        let snapshot = store.delete_author(1).unwrap();

        assert!(snapshot.books().is_empty());
        assert!(snapshot.find_book(101).is_none());
        assert!(matches!(
            store.delete_author(1),
            Err(DeleteAuthorError::NotFound { id: 1 })
        ));
    }

    #[test]
    fn add_book_reuses_known_editorial() {
        let store = seeded();

        let same = store
            .add_book(2, &book_details("La casa de los espíritus", "Editorial Sudamericana"))
            .unwrap()
            .value;
        let fresh = store
            .add_book(3, &book_details("Ficciones", "Sur"))
            .unwrap()
            .value;

        assert_eq!(same.id(), 102);
        assert_eq!(same.editorial().id(), 7);
        assert_eq!(fresh.id(), 103);
        assert_eq!(fresh.editorial().id(), 8);

        let books = store.snapshot().books();
        let owners: Vec<i64> = books.iter().map(BookRecord::author_id).collect();
        assert_eq!(owners, vec![1, 2, 3]);
        assert_eq!(books[1].author_name().to_string(), "Isabel Allende");
    }

    #[test]
    fn add_book_to_missing_author() {
        let store = seeded();
        assert!(matches!(
            store.add_book(9, &book_details("Rayuela", "Sudamericana")),
            Err(CreateBookError::AuthorNotFound { id: 9 })
        ));
        assert_eq!(store.snapshot().books().len(), 1);
    }

    #[test]
    fn update_book_keeps_id_and_owner() {
        let store = seeded();
        let updated = store
            .update_book(101, &book_details("Cien años de soledad (ed. 50)", "Sudamericana S.A."))
            .unwrap()
            .value;

        assert_eq!(updated.id(), 101);
        assert_eq!(updated.name().to_string(), "Cien años de soledad (ed. 50)");
        assert_eq!(updated.editorial().id(), 7);
        assert_eq!(updated.editorial().name().to_string(), "Sudamericana S.A.");

        let record = store.snapshot().find_book(101).unwrap();
        assert_eq!(record.author_id(), 1);
        assert!(matches!(
            store.update_book(5, &book_details("x", "y")),
            Err(UpdateBookError::NotFound { id: 5 })
        ));
    }

    #[test]
    fn delete_book() {
        let store = seeded();
        let snapshot = store.delete_book(101).unwrap();
        assert!(snapshot.find_author(1).unwrap().books().is_empty());
        assert!(matches!(
            store.delete_book(101),
            Err(DeleteBookError::NotFound { id: 101 })
        ));
    }

    struct FixedSource(Result<Vec<Author>, u16>);

    #[async_trait]
    impl AuthorSource for FixedSource {
        async fn fetch_authors(&self) -> Result<Vec<Author>, FetchAuthorsError> {
            self.0.clone().map_err(FetchAuthorsError::Status)
        }
    }

    #[tokio::test]
    async fn refresh_installs_fetched_authors() {
        let store = seeded();
        let source = FixedSource(Ok(vec![Author::new(
            10,
            details("Octavio Paz"),
            Vec::new(),
            Vec::new(),
            Progress::default(),
        )]));

        let load = store.refresh(&source).await;

        assert_eq!(load, LoadState::default());
        assert_eq!(store.snapshot().len(), 1);
        assert!(store.snapshot().find_author(10).is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_authors_and_records_error() {
        let store = seeded();

        let load = store.refresh(&FixedSource(Err(500))).await;

        assert!(!load.loading);
        assert_eq!(load.error.as_deref(), Some("HTTP error status: 500"));
        assert_eq!(store.load_state(), load);
        assert_eq!(store.snapshot().len(), 3);

        let load = store.refresh(&FixedSource(Ok(Vec::new()))).await;
        assert_eq!(load.error, None);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn ids_past_the_largest_fall_back_to_lowest_free() {
        let book = Book::new(
            i64::MAX,
            book_details("El Aleph", "Losada"),
            Editorial::new(i64::MAX, EditorialName::new_unchecked("Losada")),
        );
        let author = Author::new(
            i64::MAX,
            details("Jorge Luis Borges"),
            vec![book],
            Vec::new(),
            Progress::default(),
        );
        let store = AuthorStore::with_authors(vec![author]);

        assert_eq!(store.add_author(&details("Silvina Ocampo")).value.id(), 1);
        let added = store
            .add_book(i64::MAX, &book_details("Ficciones", "Sur"))
            .unwrap()
            .value;
        assert_eq!(added.id(), 1);
        assert_eq!(added.editorial().id(), 1);
        assert_eq!(store.add_author(&details("Bioy Casares")).value.id(), 2);
    }

    #[tokio::test]
    async fn new_store_is_loading_until_first_refresh() {
        let store = AuthorStore::new();
        assert!(store.load_state().loading);
        assert!(store.snapshot().is_empty());

        let load = store.refresh(&FixedSource(Ok(Vec::new()))).await;

        assert!(!load.loading);
        assert!(!store.load_state().loading);
        assert!(!seeded().load_state().loading);
    }

    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AuthorSource for GatedSource {
        async fn fetch_authors(&self) -> Result<Vec<Author>, FetchAuthorsError> {
            self.gate.notified().await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn loading_holds_while_another_refresh_runs() {
        let store = AuthorStore::new();
        let gate = Arc::new(Notify::new());
        let slow = GatedSource {
            gate: Arc::clone(&gate),
        };

        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.refresh(&slow).await })
        };
        tokio::task::yield_now().await;

        let load = store.refresh(&FixedSource(Ok(Vec::new()))).await;
        assert!(load.loading);

        gate.notify_one();
        let load = pending.await.unwrap();
        assert!(!load.loading);
        assert!(!store.load_state().loading);
    }
}
