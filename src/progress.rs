use crate::models::Author;
use serde::Serialize;

/// Classification of a single author's reading progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadingStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ReadingStatus {
    /// Label shown to readers of the collection.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Sin iniciar",
            Self::InProgress => "En curso",
            Self::Completed => "Completado",
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derives the status for a progress percentage.
///
/// Values outside `0..=100` are not rejected and classify as
/// [`ReadingStatus::InProgress`].
pub const fn classify(progress: i32) -> ReadingStatus {
    match progress {
        0 => ReadingStatus::NotStarted,
        100 => ReadingStatus::Completed,
        _ => ReadingStatus::InProgress,
    }
}

/// Summary of reading progress across a collection of authors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    pub average: f64,
    pub sin_iniciar: usize,
    pub en_curso: usize,
    pub completado: usize,
}

impl ReadingStats {
    /// Number of authors the stats were computed over.
    pub const fn total(&self) -> usize {
        self.sin_iniciar + self.en_curso + self.completado
    }

    /// The average rounded to one decimal, e.g. `91.7%`.
    pub fn average_display(&self) -> String {
        format!("{:.1}%", self.average)
    }
}

pub fn aggregate(authors: &[Author]) -> ReadingStats {
    if authors.is_empty() {
        return ReadingStats::default();
    }

    let mut stats = ReadingStats::default();
    let mut sum = 0i64;
    for author in authors {
        let progress = author.reading_progress().value();
        sum += i64::from(progress);
        match classify(progress) {
            ReadingStatus::NotStarted => stats.sin_iniciar += 1,
            ReadingStatus::InProgress => stats.en_curso += 1,
            ReadingStatus::Completed => stats.completado += 1,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let average = sum as f64 / authors.len() as f64;
    stats.average = average;
    stats
}
