use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    models::{Movie, MovieDetail, Page, SortBy},
    store::{
        MovieValues, OpResult, Operation, ParentRef, ResourcePath, ReviewValues, RowValues, Store,
        VideoValues, decode,
    },
    tmdb::RemoteCatalog,
};

/// Outcome of a favorites sweep.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncReport {
    pub total: usize,
    pub refreshed: usize,
}

/// Single entry point the UI layers talk to: remote reads pass through, and
/// every local mutation is phrased as a store batch.
#[derive(Clone)]
pub struct CatalogRepo {
    store: Store,
    remote: Arc<dyn RemoteCatalog>,
}

impl CatalogRepo {
    pub fn new(store: Store, remote: Arc<dyn RemoteCatalog>) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn fetch_page(&self, page: u32, sort: SortBy) -> Result<Page<Movie>> {
        self.remote.fetch_page(page, sort).await
    }

    pub async fn fetch_detail(&self, db_id: i64) -> Result<MovieDetail> {
        self.remote.fetch_detail(db_id).await
    }

    /// Saves a movie and its children as one batch. Reviews keep their wire
    /// order; only YouTube videos are kept. Returns the new movie row id.
    pub async fn favorite(&self, movie: &Movie) -> Result<i64> {
        let mut ops = vec![Operation::Insert {
            path: ResourcePath::Movies,
            values: RowValues::Movie(MovieValues::from_movie(movie)),
        }];
        for review in &movie.reviews {
            ops.push(Operation::Insert {
                path: ResourcePath::Reviews,
                values: RowValues::Review(ReviewValues {
                    parent: ParentRef::BackRef(0),
                    author: review.author.clone(),
                    content: review.content.clone(),
                    url: review.url.clone(),
                }),
            });
        }
        for video in movie.videos.iter().filter(|v| v.is_youtube()) {
            ops.push(Operation::Insert {
                path: ResourcePath::Videos,
                values: RowValues::Video(VideoValues {
                    parent: ParentRef::BackRef(0),
                    name: video.name.clone(),
                    key: video.key.clone(),
                    site: video.site.clone(),
                    size: video.size,
                    kind: video.kind.clone(),
                }),
            });
        }

        let children = ops.len() - 1;
        let results = self.store.apply_batch(ops).await?;
        let Some(OpResult::Inserted { row_id }) = results.first().copied() else {
            return Err(Error::BadBackRef { step: 0 });
        };
        debug!(db_id = movie.db_id, row_id = row_id, children = children, "favorited movie");
        Ok(row_id)
    }

    /// Removes a saved movie; its children go with it via cascade.
    pub async fn unfavorite(&self, row_id: i64) -> Result<u64> {
        let rows = self.store.delete(ResourcePath::Movie(row_id), None).await?;
        debug!(row_id = row_id, rows = rows, "unfavorited movie");
        Ok(rows)
    }

    /// Re-syncs a saved movie from a fresh detail: scalars updated in place,
    /// children dropped and re-inserted, all in one batch.
    pub async fn refresh_favorite(&self, detail: &MovieDetail, row_id: i64) -> Result<()> {
        let mut ops = vec![
            Operation::Update {
                path: ResourcePath::Movie(row_id),
                values: RowValues::Movie(MovieValues::from_movie(&detail.movie)),
            },
            Operation::Delete { path: ResourcePath::Reviews, owner: Some(ParentRef::Row(row_id)) },
        ];
        for review in &detail.reviews.items {
            ops.push(Operation::Insert {
                path: ResourcePath::Reviews,
                values: RowValues::Review(ReviewValues {
                    parent: ParentRef::Row(row_id),
                    author: review.author.clone(),
                    content: review.content.clone(),
                    url: review.url.clone(),
                }),
            });
        }
        ops.push(Operation::Delete {
            path: ResourcePath::Videos,
            owner: Some(ParentRef::Row(row_id)),
        });
        for video in detail.videos.iter().filter(|v| v.is_youtube()) {
            ops.push(Operation::Insert {
                path: ResourcePath::Videos,
                values: RowValues::Video(VideoValues {
                    parent: ParentRef::Row(row_id),
                    name: video.name.clone(),
                    key: video.key.clone(),
                    site: video.site.clone(),
                    size: video.size,
                    kind: video.kind.clone(),
                }),
            });
        }

        self.store.apply_batch(ops).await?;
        debug!(row_id = row_id, "refreshed favorite");
        Ok(())
    }

    /// Saved movie with children decoded from the store join. Fails with
    /// `NotFound` when the row is gone.
    pub async fn load_favorite_detail(&self, row_id: i64) -> Result<Movie> {
        let rows = self.store.movie_with_children(row_id).await?;
        decode::assemble(&rows).ok_or(Error::NotFound(ResourcePath::MovieFull(row_id)))
    }

    /// Row id of the saved copy, if this remote id is saved at all.
    pub async fn is_favorited(&self, db_id: i64) -> Result<Option<i64>> {
        self.store.movie_row_for_db_id(db_id).await
    }

    pub async fn favorites(&self) -> Result<Vec<Movie>> {
        self.store.movies().await
    }

    /// Refreshes every saved movie from the remote, a bounded number at a
    /// time. Per-movie failures are logged and skipped.
    pub async fn sync_favorites(&self, max_concurrent: usize) -> Result<SyncReport> {
        let favorites = self.store.movies().await?;
        let total = favorites.len();

        let outcomes: Vec<bool> = stream::iter(favorites)
            .map(|movie| {
                let repo = self.clone();
                async move {
                    let Some(row_id) = movie.row_id else {
                        return false;
                    };
                    let refreshed: Result<()> = async {
                        let detail = repo.fetch_detail(movie.db_id).await?;
                        repo.refresh_favorite(&detail, row_id).await
                    }
                    .await;
                    match refreshed {
                        Ok(()) => true,
                        Err(err) => {
                            warn!(db_id = movie.db_id, error = %err, "failed to refresh favorite");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

        let refreshed = outcomes.into_iter().filter(|ok| *ok).count();
        debug!(total = total, refreshed = refreshed, "favorites sync finished");
        Ok(SyncReport { total, refreshed })
    }
}
