//! Page controller: owns the fetched collection, the current document and the
//! user's preferences, and drives the load cycle on every navigation.
//!
//! Every navigation takes a new generation number before it starts fetching.
//! When the fetches settle, the result is committed only if no newer
//! navigation has started and the language has not changed in the meantime;
//! otherwise it is dropped. Callers may therefore fire navigations
//! concurrently and the controller always ends up showing the latest one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context as _;
use serde::Serialize;

use crate::client::{ContentSource, FetchFailure};
use crate::formats::{DocumentRecord, Language, Theme};
use crate::i18n::labels;
use crate::nav::NavigationTree;
use crate::prefs::{PreferenceStore, UserPreferences};
use crate::toc::{HeadingDescriptor, extract_headings};
use crate::tracker::{ActivePolicy, HeadingBox, SectionTracker, Viewport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageState {
    Loading,
    Error {
        message: String,
    },
    Ready {
        document: DocumentRecord,
        /// Slug that was requested but has no edition in the current language.
        fallback_from: Option<String>,
    },
    ReadyEmpty,
}

impl PageState {
    pub fn document(&self) -> Option<&DocumentRecord> {
        match self {
            Self::Ready { document, .. } => Some(document),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    Committed,
    /// A newer navigation started, or the language changed, before this one
    /// settled.
    Superseded,
}

/// Neighbors of the current document in collection order. Never wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination<'a> {
    pub prev: Option<&'a DocumentRecord>,
    pub next: Option<&'a DocumentRecord>,
}

impl<'a> Pagination<'a> {
    pub fn around(collection: &'a [DocumentRecord], slug: &str) -> Self {
        let Some(idx) = collection.iter().position(|d| d.slug == slug) else {
            return Self::default();
        };
        Self {
            prev: idx.checked_sub(1).and_then(|i| collection.get(i)),
            next: collection.get(idx + 1),
        }
    }
}

/// Everything a view needs to render the page at one instant.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub state: PageState,
    pub collection: Arc<Vec<DocumentRecord>>,
    pub preferences: UserPreferences,
    pub requested_slug: Option<String>,
    pub headings: Vec<HeadingDescriptor>,
    pub active_heading: Option<String>,
    pub mobile_nav_open: bool,
}

impl PageSnapshot {
    pub fn navigation(&self) -> NavigationTree<'_> {
        NavigationTree::build(&self.collection)
    }

    pub fn pagination(&self) -> Pagination<'_> {
        match self.state.document() {
            Some(doc) => Pagination::around(&self.collection, &doc.slug),
            None => Pagination::default(),
        }
    }

    /// Slug highlighted in the sidebar.
    pub fn active_slug(&self) -> Option<&str> {
        self.state.document().map(|d| d.slug.as_str())
    }
}

#[derive(Debug)]
struct Inner {
    preferences: UserPreferences,
    requested_slug: Option<String>,
    state: PageState,
    collection: Arc<Vec<DocumentRecord>>,
    headings: Vec<HeadingDescriptor>,
    tracker: SectionTracker,
    mobile_nav_open: bool,
}

pub struct PageController {
    source: Arc<dyn ContentSource>,
    store: Arc<dyn PreferenceStore>,
    generation: AtomicU64,
    inner: Mutex<Inner>,
}

impl PageController {
    /// Restores saved preferences and enters `Loading`. Nothing is fetched until
    /// the first [`PageController::navigate`].
    pub async fn start(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn PreferenceStore>,
        policy: ActivePolicy,
    ) -> anyhow::Result<Self> {
        let preferences = store.load().await.context("load preferences")?;
        tracing::debug!(?preferences, "restored preferences");
        Ok(Self {
            source,
            store,
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                preferences,
                requested_slug: None,
                state: PageState::Loading,
                collection: Arc::new(Vec::new()),
                headings: Vec::new(),
                tracker: SectionTracker::new(policy),
                mobile_nav_open: false,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn preferences(&self) -> UserPreferences {
        self.lock().preferences
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let inner = self.lock();
        PageSnapshot {
            state: inner.state.clone(),
            collection: Arc::clone(&inner.collection),
            preferences: inner.preferences,
            requested_slug: inner.requested_slug.clone(),
            headings: inner.headings.clone(),
            active_heading: inner.tracker.active().map(str::to_owned),
            mobile_nav_open: inner.mobile_nav_open,
        }
    }

    /// Loads the collection for the current language and resolves `slug`
    /// against it. Without a slug the first record is shown.
    pub async fn navigate(&self, slug: Option<&str>) -> NavigateOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let language = {
            let mut inner = self.lock();
            inner.requested_slug = slug.map(str::to_owned);
            inner.state = PageState::Loading;
            inner.preferences.language
        };
        tracing::debug!(generation, ?slug, %language, "navigating");

        let result = self.fetch(slug, language).await;

        let mut inner = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, ?slug, "discarding superseded response");
            return NavigateOutcome::Superseded;
        }
        if inner.preferences.language != language {
            tracing::debug!(
                generation,
                ?slug,
                fetched = %language,
                current = %inner.preferences.language,
                "discarding response for a previous language"
            );
            return NavigateOutcome::Superseded;
        }

        match result {
            Ok((collection, found)) => {
                let state = resolve(&collection, slug, found);
                if let PageState::Ready {
                    document,
                    fallback_from: Some(requested),
                } = &state
                {
                    tracing::info!(
                        requested = %requested,
                        served = %document.slug,
                        %language,
                        "no edition in this language; serving first document"
                    );
                }
                inner.headings = state
                    .document()
                    .map(|d| extract_headings(&d.content))
                    .unwrap_or_default();
                let ids = inner.headings.iter().map(|h| h.id.clone()).collect::<Vec<_>>();
                inner.tracker.reset(ids);
                inner.collection = Arc::new(collection);
                inner.state = state;
            }
            Err(err) => {
                tracing::error!(?slug, %language, error = %err, "failed to load documentation");
                inner.headings.clear();
                inner.tracker.teardown();
                inner.state = PageState::Error {
                    message: labels(language).load_failed.to_owned(),
                };
            }
        }
        NavigateOutcome::Committed
    }

    async fn fetch(
        &self,
        slug: Option<&str>,
        language: Language,
    ) -> Result<(Vec<DocumentRecord>, Option<DocumentRecord>), FetchFailure> {
        tokio::try_join!(self.source.fetch_collection(language), async {
            match slug {
                Some(slug) => self.source.fetch_by_slug(slug, language).await,
                None => Ok(None),
            }
        })
    }

    /// Persists the new language and reloads the current slug in it.
    pub async fn set_language(&self, language: Language) -> anyhow::Result<NavigateOutcome> {
        self.remember_language(language).await?;
        let slug = self.lock().requested_slug.clone();
        Ok(self.navigate(slug.as_deref()).await)
    }

    /// Persists the new language without reloading; the next navigation uses it.
    /// A navigation still fetching the previous language is discarded.
    pub async fn remember_language(&self, language: Language) -> anyhow::Result<()> {
        self.update_preferences(|prefs| prefs.language = language).await
    }

    pub async fn set_theme(&self, theme: Theme) -> anyhow::Result<()> {
        self.update_preferences(|prefs| prefs.theme = theme).await
    }

    async fn update_preferences<F>(&self, change: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut UserPreferences),
    {
        let prefs = {
            let mut inner = self.lock();
            change(&mut inner.preferences);
            inner.preferences
        };
        tracing::debug!(?prefs, "saving preferences");
        self.store.save(&prefs).await.context("save preferences")
    }

    pub async fn toggle_theme(&self) -> anyhow::Result<Theme> {
        let theme = self.preferences().theme.toggled();
        self.set_theme(theme).await?;
        Ok(theme)
    }

    pub fn set_mobile_nav(&self, open: bool) {
        self.lock().mobile_nav_open = open;
    }

    /// Page scrolling is locked while the mobile navigation overlay is open.
    pub fn scroll_locked(&self) -> bool {
        self.lock().mobile_nav_open
    }

    /// Feeds rendered heading geometry to the active-section tracker.
    pub fn observe_viewport(&self, viewport: Viewport, headings: &[HeadingBox]) -> Option<String> {
        self.lock()
            .tracker
            .observe(viewport, headings)
            .map(str::to_owned)
    }
}

fn resolve(
    collection: &[DocumentRecord],
    requested: Option<&str>,
    found: Option<DocumentRecord>,
) -> PageState {
    if let Some(document) = found {
        return PageState::Ready {
            document,
            fallback_from: None,
        };
    }
    match collection.first() {
        Some(first) => PageState::Ready {
            document: first.clone(),
            fallback_from: requested.map(str::to_owned),
        },
        None => PageState::ReadyEmpty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(slug: &str) -> DocumentRecord {
        DocumentRecord {
            slug: slug.to_owned(),
            title: slug.to_uppercase(),
            ..DocumentRecord::default()
        }
    }

    fn slug_of(d: Option<&DocumentRecord>) -> Option<&str> {
        d.map(|d| d.slug.as_str())
    }

    #[test]
    fn pagination_around_middle_and_edges() {
        let docs = vec![doc("a"), doc("b"), doc("c")];

        let mid = Pagination::around(&docs, "b");
        assert_eq!(slug_of(mid.prev), Some("a"));
        assert_eq!(slug_of(mid.next), Some("c"));

        let first = Pagination::around(&docs, "a");
        assert_eq!(slug_of(first.prev), None);
        assert_eq!(slug_of(first.next), Some("b"));

        let last = Pagination::around(&docs, "c");
        assert_eq!(slug_of(last.prev), Some("b"));
        assert_eq!(slug_of(last.next), None);
    }

    #[test]
    fn pagination_for_unknown_slug_is_empty() {
        let docs = vec![doc("a"), doc("b")];
        assert_eq!(Pagination::around(&docs, "zzz"), Pagination::default());
        assert_eq!(Pagination::around(&[], "a"), Pagination::default());
    }

    #[test]
    fn resolve_prefers_found_record() {
        let docs = vec![doc("a"), doc("b")];
        let state = resolve(&docs, Some("b"), Some(doc("b")));
        assert_eq!(slug_of(state.document()), Some("b"));
    }

    #[test]
    fn resolve_falls_back_to_first_record() {
        let docs = vec![doc("a"), doc("b")];
        let state = resolve(&docs, Some("pricing"), None);
        assert_eq!(
            state,
            PageState::Ready {
                document: doc("a"),
                fallback_from: Some("pricing".to_owned()),
            }
        );

        let index = resolve(&docs, None, None);
        assert_eq!(
            index,
            PageState::Ready {
                document: doc("a"),
                fallback_from: None,
            }
        );
    }

    #[test]
    fn resolve_empty_collection_is_ready_empty() {
        assert_eq!(resolve(&[], Some("a"), None), PageState::ReadyEmpty);
        assert_eq!(resolve(&[], None, None), PageState::ReadyEmpty);
    }
}
