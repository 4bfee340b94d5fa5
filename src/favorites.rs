use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    models::Movie,
    repo::CatalogRepo,
    signal::{ListSignal, SignalSender},
    store::ResourcePath,
};

struct FavCore {
    movies: Vec<Movie>,
    selected: Option<i64>,
}

/// Saved-movies list that stays true to the store: every committed change
/// to the movies collection re-runs the query and pushes `ItemsChanged`.
pub struct FavoritesList {
    repo: CatalogRepo,
    signals: SignalSender,
    core: Mutex<FavCore>,
}

impl FavoritesList {
    pub fn new(repo: CatalogRepo, signals: SignalSender) -> Self {
        Self { repo, signals, core: Mutex::new(FavCore { movies: Vec::new(), selected: None }) }
    }

    /// Runs the initial query, then re-queries on every movies change until
    /// the store goes away. The handle is the embedder's to abort on
    /// teardown.
    pub fn attach(self: &Arc<Self>) -> JoinHandle<()> {
        let list = Arc::clone(self);
        let mut changes = list.repo.store().subscribe();
        tokio::spawn(async move {
            list.refresh().await;
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if change.path.collection() != ResourcePath::Movies {
                            continue;
                        }
                        // a burst of commits collapses into one query
                        while changes.try_recv().is_ok() {}
                        list.refresh().await;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed = missed, "change stream lagged, re-querying");
                        list.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("favorites watcher stopped");
        })
    }

    /// Re-runs the favorites query and signals the view.
    pub async fn refresh(&self) {
        match self.repo.favorites().await {
            Ok(movies) => {
                self.lock().movies = movies;
                self.emit(ListSignal::ItemsChanged);
            }
            Err(err) => {
                warn!(error = %err, "favorites query failed");
                self.emit(ListSignal::Error {
                    message: err.to_string(),
                    kind: err.kind(),
                    retry: None,
                });
            }
        }
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.lock().movies.clone()
    }

    /// Marks a movie as the open detail. Returns false when it already is,
    /// so a second tap on the same row does not reload the pane.
    pub fn select(&self, db_id: i64) -> bool {
        let mut core = self.lock();
        if core.selected == Some(db_id) {
            return false;
        }
        core.selected = Some(db_id);
        true
    }

    pub fn selected(&self) -> Option<i64> {
        self.lock().selected
    }

    pub fn clear_selection(&self) {
        self.lock().selected = None;
    }

    fn emit(&self, signal: ListSignal) {
        let _ = self.signals.send(signal);
    }

    fn lock(&self) -> MutexGuard<'_, FavCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
