use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::{
    models::{Movie, SortBy},
    prefs::SortPrefs,
    repo::CatalogRepo,
    signal::{ListSignal, RetryAction, SignalSender},
};

/// Where list focus goes after a sort switch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOutcome {
    /// Still browsing the remote catalog; a fresh page-one fetch ran.
    Online,
    /// The saved-movies list takes over; browse state is kept for the way
    /// back.
    Favorites,
    /// Same sort as before, nothing done.
    Unchanged,
}

/// Load phase of the browse list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadState {
    Idle,
    LoadingFirst,
    Refreshing,
    LoadingMore,
    SwitchingSort,
}

/// One visible list slot: a movie, or the tail row shown while the next
/// page loads.
#[derive(Clone, Debug, PartialEq)]
pub enum ListEntry {
    Movie(Movie),
    LoadingMore,
}

#[derive(Clone, Copy, Debug)]
enum FetchKind {
    First,
    Refresh,
    More,
    Switch,
}

impl FetchKind {
    fn retry(self, sort: SortBy) -> RetryAction {
        match self {
            FetchKind::First => RetryAction::LoadFirst,
            FetchKind::Refresh => RetryAction::Refresh,
            FetchKind::More => RetryAction::LoadMore,
            FetchKind::Switch => RetryAction::SwitchSort(sort),
        }
    }
}

struct BrowseCore {
    entries: Vec<ListEntry>,
    state: LoadState,
    sort: SortBy,
    /// Next page to request; loading page n moves this to n + 1.
    page: u32,
    total_pages: Option<u32>,
    /// Bumped to invalidate whatever is in flight.
    epoch: u64,
    /// Page number of the fetch currently in flight, if any.
    inflight: Option<u32>,
}

impl BrowseCore {
    fn can_load_more(&self, bound: u32) -> bool {
        if self.page > bound {
            return false;
        }
        match self.total_pages {
            Some(total) => self.page <= total,
            None => true,
        }
    }

    fn pop_sentinel(&mut self) -> Option<usize> {
        if matches!(self.entries.last(), Some(ListEntry::LoadingMore)) {
            self.entries.pop();
            Some(self.entries.len())
        } else {
            None
        }
    }
}

/// Infinite-scroll state machine over the remote catalog.
///
/// All methods take `&self`; the mutable core sits behind a mutex that is
/// never held across an await. A fetch result only applies while its epoch
/// still matches, so a sort switch or [`close`](Self::close) strands late
/// responses instead of corrupting the list.
pub struct BrowseList {
    repo: CatalogRepo,
    prefs: SortPrefs,
    signals: SignalSender,
    max_page_bound: u32,
    core: Mutex<BrowseCore>,
}

impl BrowseList {
    pub fn new(
        repo: CatalogRepo,
        prefs: SortPrefs,
        signals: SignalSender,
        initial_sort: SortBy,
        max_page_bound: u32,
    ) -> Self {
        Self {
            repo,
            prefs,
            signals,
            max_page_bound,
            core: Mutex::new(BrowseCore {
                entries: Vec::new(),
                state: LoadState::Idle,
                sort: initial_sort,
                page: 1,
                total_pages: None,
                epoch: 0,
                inflight: None,
            }),
        }
    }

    /// First-view load: fetches page one unless the list already has
    /// content or something is running.
    pub async fn start(&self) {
        let (epoch, sort) = {
            let mut core = self.lock();
            if !core.sort.is_remote()
                || core.state != LoadState::Idle
                || core.inflight.is_some()
                || !core.entries.is_empty()
            {
                return;
            }
            core.state = LoadState::LoadingFirst;
            core.inflight = Some(1);
            (core.epoch, core.sort)
        };
        self.fetch_and_apply(1, sort, epoch, FetchKind::First).await;
    }

    /// Replaces the list with a fresh page one. The scroll position is the
    /// view's to keep, so no scroll signal is emitted.
    pub async fn refresh(&self) {
        let (epoch, sort) = {
            let mut core = self.lock();
            if !core.sort.is_remote() || core.state != LoadState::Idle || core.inflight.is_some()
            {
                return;
            }
            core.state = LoadState::Refreshing;
            core.inflight = Some(1);
            (core.epoch, core.sort)
        };
        self.fetch_and_apply(1, sort, epoch, FetchKind::Refresh).await;
    }

    /// Appends the next page, showing a tail sentinel row while the fetch
    /// runs. A call while one is already running is dropped, as are calls
    /// past the last page.
    pub async fn load_more(&self) {
        let (page, epoch, sort, sentinel_pos) = {
            let mut core = self.lock();
            if !core.sort.is_remote() || core.state != LoadState::Idle || core.inflight.is_some()
            {
                return;
            }
            if core.entries.is_empty() || !core.can_load_more(self.max_page_bound) {
                return;
            }
            core.state = LoadState::LoadingMore;
            core.inflight = Some(core.page);
            core.entries.push(ListEntry::LoadingMore);
            (core.page, core.epoch, core.sort, core.entries.len() - 1)
        };
        self.emit(ListSignal::ItemsInserted { start: sentinel_pos, count: 1 });
        self.fetch_and_apply(page, sort, epoch, FetchKind::More).await;
    }

    /// Switches ordering. A real sort change is persisted first; switching
    /// to [`SortBy::Favorite`] hands the screen to the saved-movies list
    /// without dropping browse state, anything else clears the list and
    /// fetches page one of the new ordering.
    pub async fn set_sort(&self, sort: SortBy) -> SortOutcome {
        let current = self.lock().sort;
        if sort == current {
            return SortOutcome::Unchanged;
        }
        if let Err(err) = self.prefs.save(sort).await {
            warn!(error = %err, "failed to persist sort selection");
        }
        if !sort.is_remote() {
            let removed = {
                let mut core = self.lock();
                core.sort = sort;
                core.epoch += 1;
                core.inflight = None;
                core.state = LoadState::Idle;
                core.pop_sentinel()
            };
            if let Some(pos) = removed {
                self.emit(ListSignal::ItemRemoved { pos });
            }
            debug!("switched to favorites mode");
            return SortOutcome::Favorites;
        }
        debug!(sort = ?sort, "switching sort");
        self.switch_fetch(sort).await;
        SortOutcome::Online
    }

    /// Re-runs a failed action with its original parameters.
    pub async fn retry(&self, action: RetryAction) {
        match action {
            RetryAction::LoadFirst => self.start().await,
            RetryAction::Refresh => self.refresh().await,
            RetryAction::LoadMore => self.load_more().await,
            RetryAction::SwitchSort(sort) => {
                if sort.is_remote() {
                    self.switch_fetch(sort).await;
                }
            }
        }
    }

    /// Abandons whatever is in flight; its result is discarded when it
    /// lands. Safe to call repeatedly.
    pub fn close(&self) {
        let mut core = self.lock();
        core.epoch += 1;
        core.inflight = None;
        core.pop_sentinel();
        core.state = LoadState::Idle;
    }

    pub fn snapshot(&self) -> Vec<ListEntry> {
        self.lock().entries.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().state
    }

    pub fn sort(&self) -> SortBy {
        self.lock().sort
    }

    /// Next page the machine will request.
    pub fn next_page(&self) -> u32 {
        self.lock().page
    }

    async fn switch_fetch(&self, sort: SortBy) {
        let epoch = {
            let mut core = self.lock();
            core.sort = sort;
            core.epoch += 1;
            core.inflight = Some(1);
            core.state = LoadState::SwitchingSort;
            core.page = 1;
            core.total_pages = None;
            core.entries.clear();
            core.epoch
        };
        self.emit(ListSignal::ItemsChanged);
        self.fetch_and_apply(1, sort, epoch, FetchKind::Switch).await;
    }

    async fn fetch_and_apply(&self, page: u32, sort: SortBy, epoch: u64, kind: FetchKind) {
        debug!(page = page, sort = ?sort, kind = ?kind, "fetching page");
        let result = self.repo.fetch_page(page, sort).await;

        let mut core = self.lock();
        if core.epoch != epoch {
            debug!(page = page, "superseded fetch discarded");
            return;
        }
        core.inflight = None;

        match result {
            Ok(fetched) => {
                core.total_pages = Some(fetched.total_pages);
                core.page = page + 1;
                core.state = LoadState::Idle;
                match kind {
                    FetchKind::First | FetchKind::Refresh | FetchKind::Switch => {
                        core.entries = fetched.items.into_iter().map(ListEntry::Movie).collect();
                        self.emit(ListSignal::ItemsChanged);
                        if !matches!(kind, FetchKind::Refresh) && !core.entries.is_empty() {
                            self.emit(ListSignal::ScrollTo { pos: 0 });
                        }
                    }
                    FetchKind::More => {
                        if let Some(pos) = core.pop_sentinel() {
                            self.emit(ListSignal::ItemRemoved { pos });
                        }
                        let start = core.entries.len();
                        let count = fetched.items.len();
                        core.entries.extend(fetched.items.into_iter().map(ListEntry::Movie));
                        if count > 0 {
                            self.emit(ListSignal::ItemsInserted { start, count });
                        }
                    }
                }
                debug!(page = page, entries = core.entries.len(), "page applied");
            }
            Err(err) => {
                warn!(page = page, error = %err, "page fetch failed");
                if let Some(pos) = core.pop_sentinel() {
                    self.emit(ListSignal::ItemRemoved { pos });
                }
                core.state = LoadState::Idle;
                self.emit(ListSignal::Error {
                    message: err.to_string(),
                    kind: err.kind(),
                    retry: Some(kind.retry(sort)),
                });
            }
        }
    }

    fn emit(&self, signal: ListSignal) {
        let _ = self.signals.send(signal);
    }

    fn lock(&self) -> MutexGuard<'_, BrowseCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
