//! Debounced asynchronous suggestion search.
//!
//! A [`SuggestionSession`] sits between the input controller and an
//! externally supplied [`SearchProvider`]. Every keystroke updates the
//! query; the session coalesces updates behind a debounce timer, runs at
//! most one provider call at a time, and guarantees that only the most
//! recently issued query can reach the [`SessionReporter`].
//!
//! Staleness is enforced by compare-and-discard, not by aborting the
//! provider: each issued search captures a generation token and re-checks
//! it against the session's latest generation after every suspension
//! point. Superseded tasks are additionally aborted as an optimization,
//! but a provider that resolves late is discarded even if the abort never
//! lands. Providers therefore do not need to support cancellation; they
//! only need to be side-effect free on stale completion.

use chipline_core::Suggestion;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Default debounce window between the last keystroke and the provider call.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider observed its own cancellation signal. Never surfaced to
    /// an error hook; reported only so loading state can settle.
    #[error("search cancelled")]
    Cancelled,
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Externally supplied async search. Called once per debounced query.
#[async_trait::async_trait]
pub trait SearchProvider<T>: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion<T>>, SearchError>;
}

/// Receives session lifecycle callbacks. All callbacks carry the query they
/// belong to so the consumer can apply its own freshness check on top of
/// the session's generation check.
pub trait SessionReporter<T>: Send + Sync + 'static {
    /// The debounce window elapsed and a provider call is now in flight.
    fn on_search_started(&self, query: &str);

    /// The latest issued search resolved.
    fn on_results(&self, query: &str, items: Vec<Suggestion<T>>);

    /// The latest issued search failed. [`SearchError::Cancelled`] must be
    /// treated as a quiet terminal state, not an error.
    fn on_error(&self, query: &str, error: &SearchError);
}

struct SessionState {
    /// Last query handed to `update_query`, trimmed. `None` after `reset()`
    /// so repeating the same query re-triggers a search.
    latest_query: Option<String>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// One debounced search pipeline per input instance.
pub struct SuggestionSession<T> {
    state: Arc<Mutex<SessionState>>,
    provider: Arc<dyn SearchProvider<T>>,
    reporter: Arc<dyn SessionReporter<T>>,
    debounce: Duration,
}

impl<T> SuggestionSession<T>
where
    T: Send + 'static,
{
    pub fn new(
        provider: Arc<dyn SearchProvider<T>>,
        reporter: Arc<dyn SessionReporter<T>>,
        debounce: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                latest_query: None,
                generation: 0,
                task: None,
            })),
            provider,
            reporter,
            debounce,
        }
    }

    /// Call on every edit of the pending text. Restarts the debounce timer;
    /// an empty (trimmed) query cancels outstanding work and goes idle
    /// without touching the provider or the reporter.
    pub fn update_query(&self, query: &str) {
        let query = query.trim().to_string();
        #[expect(clippy::unwrap_used)]
        let mut st = self.state.lock().unwrap();
        if st.latest_query.as_deref() == Some(query.as_str()) {
            return;
        }
        st.latest_query = Some(query.clone());
        st.generation = st.generation.wrapping_add(1);
        if let Some(task) = st.task.take() {
            task.abort();
        }
        if query.is_empty() {
            return;
        }

        let generation = st.generation;
        let state = self.state.clone();
        let provider = self.provider.clone();
        let reporter = self.reporter.clone();
        let debounce = self.debounce;
        st.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !is_current(&state, generation) {
                return;
            }
            reporter.on_search_started(&query);
            let outcome = provider.search(&query).await;
            if !is_current(&state, generation) {
                tracing::trace!("discarding superseded suggestion results for {query:?}");
                return;
            }
            match outcome {
                Ok(items) => reporter.on_results(&query, items),
                Err(err) => {
                    if matches!(err, SearchError::Cancelled) {
                        tracing::trace!("suggestion search cancelled for {query:?}");
                    } else {
                        tracing::warn!("suggestion search failed for {query:?}: {err}");
                    }
                    reporter.on_error(&query, &err);
                }
            }
        }));
    }

    /// Forget the last-seen query so that repeating it re-triggers a fresh
    /// search, and cancel anything outstanding.
    pub fn reset(&self) {
        #[expect(clippy::unwrap_used)]
        let mut st = self.state.lock().unwrap();
        st.latest_query = None;
        st.generation = st.generation.wrapping_add(1);
        if let Some(task) = st.task.take() {
            task.abort();
        }
    }
}

impl<T> Drop for SuggestionSession<T> {
    fn drop(&mut self) {
        if let Ok(mut st) = self.state.lock() {
            st.generation = st.generation.wrapping_add(1);
            if let Some(task) = st.task.take() {
                task.abort();
            }
        }
    }
}

fn is_current(state: &Arc<Mutex<SessionState>>, generation: u64) -> bool {
    #[expect(clippy::unwrap_used)]
    let st = state.lock().unwrap();
    st.generation == generation
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Started(String),
        Results(String, Vec<String>),
        Error(String, bool /* cancelled */),
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn results(&self) -> Vec<Event> {
            self.events()
                .into_iter()
                .filter(|e| matches!(e, Event::Results(..)))
                .collect()
        }
    }

    impl SessionReporter<String> for RecordingReporter {
        fn on_search_started(&self, query: &str) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Started(query.to_string()));
        }

        fn on_results(&self, query: &str, items: Vec<Suggestion<String>>) {
            let values = items.into_iter().map(|s| s.value).collect();
            self.events
                .lock()
                .unwrap()
                .push(Event::Results(query.to_string(), values));
        }

        fn on_error(&self, query: &str, error: &SearchError) {
            self.events.lock().unwrap().push(Event::Error(
                query.to_string(),
                matches!(error, SearchError::Cancelled),
            ));
        }
    }

    /// Provider with a per-query artificial latency and a call log.
    #[derive(Default)]
    struct ScriptedProvider {
        delays: HashMap<String, Duration>,
        fail: Option<String>,
        cancel: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl SearchProvider<String> for ScriptedProvider {
        async fn search(&self, query: &str) -> Result<Vec<Suggestion<String>>, SearchError> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail.as_deref() == Some(query) {
                return Err(SearchError::Provider(anyhow::anyhow!("backend exploded")));
            }
            if self.cancel.as_deref() == Some(query) {
                return Err(SearchError::Cancelled);
            }
            Ok(vec![Suggestion::new(
                format!("id-{query}"),
                format!("match-{query}"),
            )])
        }
    }

    fn session(
        provider: Arc<ScriptedProvider>,
        reporter: Arc<RecordingReporter>,
    ) -> SuggestionSession<String> {
        SuggestionSession::new(provider, reporter, DEFAULT_DEBOUNCE)
    }

    async fn settle(duration: Duration) {
        // Paused-clock tests: sleeping advances virtual time and drains
        // every timer that becomes due along the way.
        tokio::time::sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_coalesces_rapid_queries_into_one_search() {
        let provider = Arc::new(ScriptedProvider::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        session.update_query("al");
        session.update_query("ali");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;

        assert_eq!(provider.calls(), vec!["ali".to_string()]);
        assert_eq!(
            reporter.events(),
            vec![
                Event::Started("ali".to_string()),
                Event::Results("ali".to_string(), vec!["match-ali".to_string()]),
            ],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_superseded_search_never_reports() {
        let provider = Arc::new(ScriptedProvider {
            delays: HashMap::from([("a".to_string(), Duration::from_millis(500))]),
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        // Let "a"'s debounce fire so its provider call is in flight.
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;
        session.update_query("b");
        // "b" resolves quickly; "a" would resolve afterwards.
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(600)).await;

        assert_eq!(
            reporter.results(),
            vec![Event::Results(
                "b".to_string(),
                vec!["match-b".to_string()],
            )],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_the_same_query_does_not_research() {
        let provider = Arc::new(ScriptedProvider::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;
        session.update_query("a");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;

        assert_eq!(provider.calls(), vec!["a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_allows_the_same_query_to_search_again() {
        let provider = Arc::new(ScriptedProvider::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;
        session.reset();
        session.update_query("a");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;

        assert_eq!(provider.calls(), vec!["a".to_string(), "a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_goes_idle_without_calling_the_provider() {
        let provider = Arc::new(ScriptedProvider::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("   ");
        settle(DEFAULT_DEBOUNCE * 2).await;

        assert_eq!(provider.calls(), Vec::<String>::new());
        assert_eq!(reporter.events(), Vec::<Event>::new());
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_the_query_cancels_an_inflight_search() {
        let provider = Arc::new(ScriptedProvider {
            delays: HashMap::from([("a".to_string(), Duration::from_millis(500))]),
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;
        session.update_query("");
        settle(Duration::from_millis(600)).await;

        assert_eq!(reporter.results(), Vec::<Event>::new());
    }

    #[tokio::test(start_paused = true)]
    async fn provider_failure_reports_an_error_not_results() {
        let provider = Arc::new(ScriptedProvider {
            fail: Some("boom".to_string()),
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("boom");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;

        assert_eq!(
            reporter.events(),
            vec![
                Event::Started("boom".to_string()),
                Event::Error("boom".to_string(), false),
            ],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn provider_cancellation_is_reported_as_cancelled() {
        let provider = Arc::new(ScriptedProvider {
            cancel: Some("gone".to_string()),
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("gone");
        settle(DEFAULT_DEBOUNCE + Duration::from_millis(5)).await;

        assert_eq!(
            reporter.events(),
            vec![
                Event::Started("gone".to_string()),
                Event::Error("gone".to_string(), true),
            ],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_cancels_pending_work() {
        let provider = Arc::new(ScriptedProvider::default());
        let reporter = Arc::new(RecordingReporter::default());
        let session = session(provider.clone(), reporter.clone());

        session.update_query("a");
        drop(session);
        settle(DEFAULT_DEBOUNCE * 2).await;

        assert_eq!(provider.calls(), Vec::<String>::new());
        assert_eq!(reporter.events(), Vec::<Event>::new());
    }
}
