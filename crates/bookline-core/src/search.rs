// Debounced client search
//
// Re-expression of the booking UI's client search box: queries are debounced,
// a newer query supersedes an older one, and short queries short-circuit to
// an empty result without touching the directory at all.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::Result;
use crate::traits::ClientDirectory;

/// One client row from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
}

/// What a single `search` call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The latest results for the term
    Results(Vec<ClientSummary>),
    /// A newer query took over; discard this call
    Superseded,
}

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Debounced, supersedable search driver over a [`ClientDirectory`].
///
/// Each call waits out the debounce window before querying. A newer call
/// supersedes an older one at two points: when the older call's debounce
/// expires, and when its directory response lands. A stale in-flight result
/// is therefore never surfaced.
pub struct ClientSearch<D: ClientDirectory> {
    directory: Arc<D>,
    debounce: Duration,
    min_query_len: usize,
    generation: Arc<AtomicU64>,
}

impl<D: ClientDirectory> ClientSearch<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the debounce window (tests use a shorter one).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Run one (possibly superseded) search for `term`.
    pub async fn search(&self, term: &str) -> Result<SearchOutcome> {
        let term = term.trim();
        if term.len() < self.min_query_len {
            // Too short to be a useful query; answer without the network.
            return Ok(SearchOutcome::Results(Vec::new()));
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(term, "Search superseded during debounce");
            return Ok(SearchOutcome::Superseded);
        }

        let results = self.directory.search(term).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(term, "Search superseded while in flight");
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailingClientDirectory, StaticClientDirectory};

    fn client(id: &str, name: &str) -> ClientSummary {
        ClientSummary {
            id: id.into(),
            name: name.into(),
            email: None,
            mobile_phone: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_short_circuits_without_directory_call() {
        let directory = Arc::new(StaticClientDirectory::new(vec![client("c1", "Ada")]));
        let search = ClientSearch::new(directory.clone());

        assert_eq!(
            search.search("a").await.unwrap(),
            SearchOutcome::Results(vec![])
        );
        assert_eq!(
            search.search("  ").await.unwrap(),
            SearchOutcome::Results(vec![])
        );
        assert_eq!(directory.calls().await.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn single_query_returns_results_after_debounce() {
        let directory = Arc::new(StaticClientDirectory::new(vec![client("c1", "Ada")]));
        let search = ClientSearch::new(directory.clone());

        let outcome = search.search("ada").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Results(vec![client("c1", "Ada")]));
        assert_eq!(directory.calls().await, vec!["ada".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_queries_supersede_at_debounce_boundary() {
        let directory = Arc::new(StaticClientDirectory::new(vec![client("c1", "Ada")]));
        let search = ClientSearch::new(directory.clone());

        let (first, second) = tokio::join!(search.search("ad"), search.search("ada"));
        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        assert_eq!(
            second.unwrap(),
            SearchOutcome::Results(vec![client("c1", "Ada")])
        );
        // the superseded query never reached the directory
        assert_eq!(directory.calls().await, vec!["ada".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_is_discarded_when_superseded() {
        let directory = Arc::new(
            StaticClientDirectory::new(vec![client("c1", "Ada")])
                .with_delay(Duration::from_millis(500)),
        );
        let search = Arc::new(ClientSearch::new(directory.clone()));

        let older = {
            let search = search.clone();
            tokio::spawn(async move { search.search("ad").await })
        };
        // let the older query pass its debounce and enter the directory call
        tokio::time::sleep(Duration::from_millis(400)).await;
        let newer = {
            let search = search.clone();
            tokio::spawn(async move { search.search("ada").await })
        };

        assert_eq!(
            older.await.unwrap().unwrap(),
            SearchOutcome::Superseded
        );
        assert_eq!(
            newer.await.unwrap().unwrap(),
            SearchOutcome::Results(vec![client("c1", "Ada")])
        );
        assert_eq!(
            directory.calls().await,
            vec!["ad".to_string(), "ada".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn directory_errors_propagate() {
        let directory = Arc::new(FailingClientDirectory::new("directory offline"));
        let search = ClientSearch::new(directory);
        let err = search.search("ada").await.unwrap_err();
        assert!(err.to_string().contains("directory offline"));
    }
}
