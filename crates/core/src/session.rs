//! # Draft Session
//!
//! Owns the session state and is the only thing that mutates it.
//!
//! ## Ordering
//!
//! Add and finish flows take a single writer gate, so they run one at a
//! time in the order they were issued. Within an add flow the steps are
//! strictly sequential: capacity check, name resolution, image fetch,
//! then slot append and card render. Searches and read-only snapshots do
//! not take the gate and stay responsive while a flow waits on the
//! network.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OnceCell, RwLock};

use crate::catalog::{CatalogService, NameIndex, PokeApiCatalog};
use crate::config::DraftConfig;
use crate::error::{DraftError, Result};
use crate::events::{DraftEvent, DraftEventKind};
use crate::submission::{HttpSubmission, SubmissionService};
use crate::suggest::SuggestionList;
use crate::team::{PaddedTeam, SessionState, Team, TeamSlot, TEAM_SIZE};

/// Read-only view of a session
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionStatus {
    pub index_loaded: bool,
    pub index_entries: usize,
    pub members: usize,
    pub capacity: usize,
    pub suggestions: Vec<String>,
}

/// A team drafting session
pub struct DraftSession {
    catalog: Arc<dyn CatalogService>,
    submission: Arc<dyn SubmissionService>,
    index: OnceCell<Arc<NameIndex>>,
    suggestions: Mutex<SuggestionList>,
    state: RwLock<SessionState>,
    writer: Mutex<()>,
    event_tx: Option<mpsc::Sender<DraftEvent>>,
}

impl DraftSession {
    pub fn new(catalog: Arc<dyn CatalogService>, submission: Arc<dyn SubmissionService>) -> Self {
        Self {
            catalog,
            submission,
            index: OnceCell::new(),
            suggestions: Mutex::new(SuggestionList::new()),
            state: RwLock::new(SessionState::new()),
            writer: Mutex::new(()),
            event_tx: None,
        }
    }

    /// Session backed by the HTTP catalog and submission clients
    pub fn from_config(config: &DraftConfig) -> Result<Self> {
        let catalog = PokeApiCatalog::new(config)?;
        let submission = HttpSubmission::new(config)?;
        Ok(Self::new(Arc::new(catalog), Arc::new(submission)))
    }

    /// Publish observable side effects on `tx`
    pub fn with_event_channel(mut self, tx: mpsc::Sender<DraftEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Fetch the name index. Only the first successful call hits the
    /// catalog; later calls return the cached size.
    pub async fn start(&self) -> Result<usize> {
        let loaded = self
            .index
            .get_or_try_init(|| async move {
                let index = self.catalog.fetch_index().await?;
                tracing::info!("Name index loaded with {} entries", index.len());
                self.emit(DraftEvent::index_loaded(index.len())).await;
                Ok::<_, DraftError>(Arc::new(index))
            })
            .await;

        match loaded {
            Ok(index) => Ok(index.len()),
            Err(e) => Err(self.report(e).await),
        }
    }

    /// The loaded name index
    pub fn index(&self) -> Result<Arc<NameIndex>> {
        self.index.get().cloned().ok_or(DraftError::IndexNotReady)
    }

    /// Match `query` against the index and render the suggestions.
    ///
    /// Before the index is loaded nothing matches.
    pub async fn search(&self, query: &str) -> Vec<String> {
        let matches = match self.index.get() {
            Some(index) if !query.is_empty() => index.matches(query),
            _ => Vec::new(),
        };

        let shown = self.suggestions.lock().await.render(matches, query).to_vec();
        self.emit(DraftEvent::new(DraftEventKind::SuggestionsCleared)).await;
        if !query.is_empty() {
            tracing::debug!(query, hits = shown.len(), "Suggestions rendered");
            self.emit(DraftEvent::suggestions_shown(&shown)).await;
        }
        shown
    }

    /// Pick a displayed suggestion; clears the list on success
    pub async fn select_suggestion(&self, clicked: &str) -> Option<String> {
        let selected = self.suggestions.lock().await.select(clicked);
        if selected.is_some() {
            self.emit(DraftEvent::new(DraftEventKind::SuggestionsCleared))
                .await;
        }
        selected
    }

    /// Pick the displayed suggestion at a 0-based position
    pub async fn select_position(&self, position: usize) -> Option<String> {
        let clicked = self.suggestions.lock().await.get(position)?.to_string();
        self.select_suggestion(&clicked).await
    }

    /// Resolve `name`, fetch its image and append it to the team.
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, name: &str) -> Result<TeamSlot> {
        let _writer = self.writer.lock().await;
        match self.add_locked(name).await {
            Ok(slot) => Ok(slot),
            Err(e) => Err(self.report(e).await),
        }
    }

    async fn add_locked(&self, name: &str) -> Result<TeamSlot> {
        self.state.read().await.team.ensure_capacity()?;

        let index = self.index()?;
        let reference = index.resolve(name)?;
        let image = self.catalog.fetch_image_reference(reference).await?;
        let slot = TeamSlot::new(name, image);

        let position = self.state.write().await.team.add_slot(slot.clone())?;
        // emit outside the state lock; the writer gate still orders cards
        self.emit(DraftEvent::card_rendered(position, &slot)).await;
        tracing::debug!(position, name, "Slot added");
        Ok(slot)
    }

    /// Pad the team, submit it and start over with an empty team.
    ///
    /// On any failure the provisional team is left as it was.
    #[tracing::instrument(skip(self))]
    pub async fn finish(&self) -> Result<PaddedTeam> {
        let _writer = self.writer.lock().await;
        match self.finish_locked().await {
            Ok(team) => Ok(team),
            Err(e) => Err(self.report(e).await),
        }
    }

    async fn finish_locked(&self) -> Result<PaddedTeam> {
        let padded = self.state.read().await.team.finish()?;
        self.submission.submit(&padded).await?;
        tracing::info!(members = padded.members(), "Team submitted");
        self.emit(DraftEvent::team_submitted(&padded)).await;

        self.state.write().await.team.clear();
        self.suggestions.lock().await.clear();
        self.emit(DraftEvent::new(DraftEventKind::SessionReset)).await;
        Ok(padded)
    }

    /// Snapshot of the provisional team
    pub async fn team(&self) -> Team {
        self.state.read().await.team.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        let index_entries = self.index.get().map(|i| i.len()).unwrap_or(0);
        SessionStatus {
            index_loaded: self.index.initialized(),
            index_entries,
            members: self.state.read().await.count(),
            capacity: TEAM_SIZE,
            suggestions: self.suggestions.lock().await.entries().to_vec(),
        }
    }

    async fn report(&self, error: DraftError) -> DraftError {
        tracing::warn!(error = %error, "Draft operation failed");
        self.emit(DraftEvent::alert(error.alert())).await;
        error
    }

    async fn emit(&self, event: DraftEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    struct FakeCatalog {
        entries: Vec<CatalogEntry>,
        fail_images: bool,
        delay: Duration,
        index_calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(names: &[&str]) -> Self {
            Self {
                entries: names
                    .iter()
                    .map(|n| CatalogEntry::new(*n, format!("/pokemon/{}", n.to_lowercase())))
                    .collect(),
                fail_images: false,
                delay: Duration::ZERO,
                index_calls: AtomicUsize::new(0),
            }
        }

        fn failing_images(mut self) -> Self {
            self.fail_images = true;
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl CatalogService for FakeCatalog {
        async fn fetch_index(&self) -> Result<NameIndex> {
            self.index_calls.fetch_add(1, Ordering::SeqCst);
            Ok(NameIndex::new(self.entries.clone()))
        }

        async fn fetch_image_reference(&self, reference: &str) -> Result<String> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_images {
                return Err(DraftError::catalog("connection reset"));
            }
            Ok(format!("/img{}.png", reference))
        }
    }

    #[derive(Default)]
    struct FakeSubmission {
        fail: bool,
        submitted: std::sync::Mutex<Vec<PaddedTeam>>,
    }

    #[async_trait]
    impl SubmissionService for FakeSubmission {
        async fn submit(&self, team: &PaddedTeam) -> Result<()> {
            if self.fail {
                return Err(DraftError::submission("503 Service Unavailable"));
            }
            self.submitted.lock().unwrap().push(team.clone());
            Ok(())
        }
    }

    const NAMES: &[&str] = &[
        "Bulbasaur",
        "Charmander",
        "Squirtle",
        "Eevee",
        "Pikachu",
        "Mew",
        "Onix",
    ];

    async fn started(catalog: FakeCatalog) -> (DraftSession, Arc<FakeSubmission>) {
        let submission = Arc::new(FakeSubmission::default());
        let session = DraftSession::new(Arc::new(catalog), submission.clone());
        session.start().await.unwrap();
        (session, submission)
    }

    fn drain(rx: &mut mpsc::Receiver<DraftEvent>) -> Vec<DraftEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_start_fetches_index_once() {
        let catalog = Arc::new(FakeCatalog::new(NAMES));
        let session = DraftSession::new(catalog.clone(), Arc::new(FakeSubmission::default()));

        assert_eq!(session.start().await.unwrap(), NAMES.len());
        assert_eq!(session.start().await.unwrap(), NAMES.len());
        assert_eq!(catalog.index_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_before_start_is_empty() {
        let session = DraftSession::new(
            Arc::new(FakeCatalog::new(NAMES)),
            Arc::new(FakeSubmission::default()),
        );
        assert!(session.search("bul").await.is_empty());
        assert_eq!(session.add("Eevee").await, Err(DraftError::IndexNotReady));
    }

    #[tokio::test]
    async fn test_search_and_select() {
        let (session, _) = started(FakeCatalog::new(&["Bulbasaur", "Charmander"])).await;

        assert_eq!(session.search("bul").await, vec!["Bulbasaur"]);
        assert_eq!(session.status().await.suggestions, vec!["Bulbasaur"]);

        assert_eq!(
            session.select_suggestion("Bulbasaur").await,
            Some("Bulbasaur".to_string())
        );
        assert!(session.status().await.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_clears_suggestions() {
        let (session, _) = started(FakeCatalog::new(NAMES)).await;
        session.search("a").await;
        assert!(session.search("").await.is_empty());
        assert!(session.status().await.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_select_position() {
        let (session, _) = started(FakeCatalog::new(NAMES)).await;
        session.search("r").await; // Bulbasaur, Charmander, Squirtle

        assert_eq!(session.select_position(1).await, Some("Charmander".to_string()));
        assert_eq!(session.select_position(0).await, None);
    }

    #[tokio::test]
    async fn test_add_unknown_name() {
        let (session, _) = started(FakeCatalog::new(&["Bulbasaur", "Charmander"])).await;

        let err = session.add("Pikachu").await.unwrap_err();

        assert_eq!(err, DraftError::not_found("Pikachu"));
        assert!(session.team().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_preserves_order_and_allows_repeats() {
        let (session, _) = started(FakeCatalog::new(NAMES)).await;

        assert_ok!(session.add("Eevee").await);
        assert_ok!(session.add("Onix").await);
        assert_ok!(session.add("Eevee").await);

        let team = session.team().await;
        let names: Vec<&str> = team.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Eevee", "Onix", "Eevee"]);
        assert_eq!(team.slots()[0].image, "/img/pokemon/eevee.png");
    }

    #[tokio::test]
    async fn test_seventh_add_is_rejected() {
        let (session, _) = started(FakeCatalog::new(NAMES)).await;
        for name in &NAMES[..6] {
            assert_ok!(session.add(name).await);
        }
        let before = session.team().await;

        let err = session.add("Onix").await.unwrap_err();

        assert_eq!(err, DraftError::CapacityExceeded { capacity: 6 });
        assert_eq!(session.team().await, before);
    }

    #[tokio::test]
    async fn test_failed_image_fetch_adds_nothing() {
        let (tx, mut rx) = mpsc::channel(64);
        let session = DraftSession::new(
            Arc::new(FakeCatalog::new(NAMES).failing_images()),
            Arc::new(FakeSubmission::default()),
        )
        .with_event_channel(tx);
        session.start().await.unwrap();

        assert!(matches!(session.add("Eevee").await, Err(DraftError::Catalog(_))));
        assert!(session.team().await.is_empty());

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| e.kind == DraftEventKind::CardRendered));
        assert_eq!(
            events.last().and_then(|e| e.message()),
            Some("Could not reach the Pokemon catalog, try again")
        );
    }

    #[tokio::test]
    async fn test_one_card_per_successful_add() {
        let (tx, mut rx) = mpsc::channel(64);
        let session = DraftSession::new(
            Arc::new(FakeCatalog::new(NAMES)),
            Arc::new(FakeSubmission::default()),
        )
        .with_event_channel(tx);
        session.start().await.unwrap();

        assert_ok!(session.add("Eevee").await);
        assert_err!(session.add("Missingno").await);
        assert_ok!(session.add("Mew").await);

        let events = drain(&mut rx);
        let cards: Vec<&DraftEvent> = events
            .iter()
            .filter(|e| e.kind == DraftEventKind::CardRendered)
            .collect();
        assert_eq!(cards.len(), session.team().await.len());
        assert_eq!(cards[1].data.as_ref().unwrap()["name"], "Mew");
        assert_eq!(cards[1].data.as_ref().unwrap()["position"], 1);

        let alerts: Vec<_> = events.iter().filter_map(|e| e.message()).collect();
        assert_eq!(alerts, vec!["Incorrect Pokemon name, try again"]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_never_exceed_capacity() {
        let catalog = FakeCatalog::new(NAMES).with_delay(Duration::from_millis(5));
        let (session, _) = started(catalog).await;
        let session = Arc::new(session);

        let mut handles = Vec::new();
        for i in 0..10 {
            let session = session.clone();
            let name = NAMES[i % NAMES.len()];
            handles.push(tokio::spawn(async move { session.add(name).await }));
        }

        let mut added = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => added += 1,
                Err(DraftError::CapacityExceeded { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(added, TEAM_SIZE);
        assert_eq!(rejected, 4);
        assert_eq!(session.status().await.members, TEAM_SIZE);
    }

    #[tokio::test]
    async fn test_snapshots_respond_while_event_consumer_is_stalled() {
        let (tx, mut rx) = mpsc::channel(1);
        let session = DraftSession::new(
            Arc::new(FakeCatalog::new(NAMES)),
            Arc::new(FakeSubmission::default()),
        )
        .with_event_channel(tx);
        // IndexLoaded fills the only slot in the channel
        session.start().await.unwrap();
        let session = Arc::new(session);

        let adder = session.clone();
        let add = tokio::spawn(async move { adder.add("Eevee").await });

        let snapshot = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let status = session.status().await;
                if status.members == 1 {
                    return status;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("status blocked while add waited on the event channel");
        assert_eq!(snapshot.members, 1);
        assert_eq!(session.team().await.len(), 1);
        assert!(!add.is_finished());

        assert_eq!(rx.recv().await.unwrap().kind, DraftEventKind::IndexLoaded);
        assert_eq!(rx.recv().await.unwrap().kind, DraftEventKind::CardRendered);
        assert_ok!(add.await.unwrap());
    }

    #[tokio::test]
    async fn test_finish_submits_padded_team_and_resets() {
        let (tx, mut rx) = mpsc::channel(64);
        let submission = Arc::new(FakeSubmission::default());
        let session = DraftSession::new(Arc::new(FakeCatalog::new(NAMES)), submission.clone())
            .with_event_channel(tx);
        session.start().await.unwrap();
        session.add("Eevee").await.unwrap();

        let padded = session.finish().await.unwrap();

        let mut expected = vec![TeamSlot::new("Eevee", "/img/pokemon/eevee.png")];
        expected.resize_with(TEAM_SIZE, TeamSlot::empty);
        assert_eq!(padded.slots(), expected.as_slice());
        assert_eq!(submission.submitted.lock().unwrap().as_slice(), &[padded]);
        assert!(session.team().await.is_empty());

        let kinds: Vec<DraftEventKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            &kinds[kinds.len() - 2..],
            &[DraftEventKind::TeamSubmitted, DraftEventKind::SessionReset]
        );
    }

    #[tokio::test]
    async fn test_finish_empty_team() {
        let (session, submission) = started(FakeCatalog::new(NAMES)).await;

        assert_eq!(session.finish().await.unwrap_err(), DraftError::EmptyTeam);
        assert!(submission.submitted.lock().unwrap().is_empty());
        assert!(session.team().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_team() {
        let submission = Arc::new(FakeSubmission {
            fail: true,
            ..Default::default()
        });
        let session = DraftSession::new(Arc::new(FakeCatalog::new(NAMES)), submission);
        session.start().await.unwrap();
        session.add("Eevee").await.unwrap();
        session.add("Mew").await.unwrap();

        assert!(matches!(
            session.finish().await,
            Err(DraftError::Submission(_))
        ));

        let team = session.team().await;
        assert_eq!(team.len(), 2);
        assert!(team.slots().iter().all(|s| !s.is_empty()));
    }
}
