use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    entities::{movie, review, video},
    error::{Error, Result},
    models::Movie,
};

use super::{decode::MovieChildRow, path::ResourcePath};

/// A committed mutation, keyed by the path it affected. Batches collapse to
/// one notification on the movies root.
#[derive(Clone, Debug)]
pub struct StoreChange {
    pub path: ResourcePath,
}

/// How a child row names its owning movie row: a concrete row id, or the
/// row produced by an earlier insert in the same batch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParentRef {
    Row(i64),
    BackRef(usize),
}

#[derive(Clone, Debug)]
pub struct MovieValues {
    pub db_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl MovieValues {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            db_id: movie.db_id,
            title: movie.title.clone(),
            release_date: movie.release_date.map(|d| d.to_string()),
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
            poster_path: movie.poster_path.clone(),
            backdrop_path: movie.backdrop_path.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReviewValues {
    pub parent: ParentRef,
    pub author: String,
    pub content: String,
    pub url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VideoValues {
    pub parent: ParentRef,
    pub name: String,
    pub key: String,
    pub site: String,
    pub size: i32,
    pub kind: String,
}

#[derive(Clone, Debug)]
pub enum RowValues {
    Movie(MovieValues),
    Review(ReviewValues),
    Video(VideoValues),
}

impl RowValues {
    fn kind(&self) -> &'static str {
        match self {
            RowValues::Movie(_) => "movie values",
            RowValues::Review(_) => "review values",
            RowValues::Video(_) => "video values",
        }
    }
}

/// One step of a batch.
#[derive(Clone, Debug)]
pub enum Operation {
    Insert { path: ResourcePath, values: RowValues },
    Update { path: ResourcePath, values: RowValues },
    Delete { path: ResourcePath, owner: Option<ParentRef> },
}

/// Per-step outcome; inserts expose the new row id for back-references.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpResult {
    Inserted { row_id: i64 },
    Affected { rows: u64 },
}

const MOVIE_WITH_CHILDREN_SQL: &str = "\
SELECT m.id AS row_id, m.db_id, m.title, m.release_date, m.vote_average, \
       m.plot, m.poster, m.backdrop, \
       r.id AS review_id, r.author AS review_author, r.content AS review_content, \
       r.url AS review_url, \
       v.id AS video_id, v.name AS video_name, v.key AS video_key, v.site AS video_site, \
       v.size AS video_size, v.type AS video_kind \
FROM movies m \
LEFT JOIN reviews r ON r.movie_id = m.id \
LEFT JOIN videos v ON v.movie_id = m.id \
WHERE m.id = ? \
ORDER BY r.id, v.id";

/// Relational store over sqlite. Writes go through paths and typed values;
/// every committed write broadcasts a [`StoreChange`].
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
    changes: broadcast::Sender<StoreChange>,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self { db, changes }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub async fn insert(&self, path: ResourcePath, values: RowValues) -> Result<i64> {
        let row_id = insert_row(&self.db, path, values, &[]).await?;
        self.notify(path);
        Ok(row_id)
    }

    pub async fn update(&self, path: ResourcePath, values: RowValues) -> Result<u64> {
        let rows = update_row(&self.db, path, values).await?;
        self.notify(path);
        Ok(rows)
    }

    pub async fn delete(&self, path: ResourcePath, owner: Option<ParentRef>) -> Result<u64> {
        let rows = delete_rows(&self.db, path, owner, &[]).await?;
        self.notify(path);
        Ok(rows)
    }

    /// Applies every operation inside one transaction. Later steps may name
    /// the row inserted by an earlier step via [`ParentRef::BackRef`]. On
    /// any failure the transaction rolls back and the failing step index is
    /// reported.
    pub async fn apply_batch(&self, ops: Vec<Operation>) -> Result<Vec<OpResult>> {
        let txn = self.db.begin().await?;
        match run_batch(&txn, ops).await {
            Ok(results) => {
                txn.commit().await?;
                debug!(steps = results.len(), "batch committed");
                self.notify(ResourcePath::Movies);
                Ok(results)
            }
            Err(err) => {
                txn.rollback().await.ok();
                Err(err)
            }
        }
    }

    /// All saved movies in insertion order, children not loaded.
    pub async fn movies(&self) -> Result<Vec<Movie>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(movie_from_entity).collect())
    }

    pub async fn movie_by_row(&self, row_id: i64) -> Result<Option<Movie>> {
        let row = movie::Entity::find_by_id(row_id).one(&self.db).await?;
        Ok(row.map(movie_from_entity))
    }

    /// Row id of the saved movie with this remote id, if any. Projects the
    /// id column only.
    pub async fn movie_row_for_db_id(&self, db_id: i64) -> Result<Option<i64>> {
        let row_id = movie::Entity::find()
            .filter(movie::Column::DbId.eq(db_id))
            .select_only()
            .column(movie::Column::Id)
            .into_tuple::<i64>()
            .one(&self.db)
            .await?;
        Ok(row_id)
    }

    /// Flattened join rows for one movie, ordered so [`super::decode::assemble`]
    /// can fold them.
    pub async fn movie_with_children(&self, row_id: i64) -> Result<Vec<MovieChildRow>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            MOVIE_WITH_CHILDREN_SQL,
            [row_id.into()],
        );
        let rows = MovieChildRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows)
    }

    fn notify(&self, path: ResourcePath) {
        debug!(path = %path, "store change");
        let _ = self.changes.send(StoreChange { path });
    }
}

async fn run_batch(txn: &DatabaseTransaction, ops: Vec<Operation>) -> Result<Vec<OpResult>> {
    let mut results = Vec::with_capacity(ops.len());
    for (step, op) in ops.into_iter().enumerate() {
        let outcome = match op {
            Operation::Insert { path, values } => insert_row(txn, path, values, &results)
                .await
                .map(|row_id| OpResult::Inserted { row_id }),
            Operation::Update { path, values } => {
                update_row(txn, path, values).await.map(|rows| OpResult::Affected { rows })
            }
            Operation::Delete { path, owner } => delete_rows(txn, path, owner, &results)
                .await
                .map(|rows| OpResult::Affected { rows }),
        };
        match outcome {
            Ok(result) => results.push(result),
            Err(source) => return Err(Error::BatchApply { step, source: Box::new(source) }),
        }
    }
    Ok(results)
}

async fn insert_row<C: ConnectionTrait>(
    conn: &C,
    path: ResourcePath,
    values: RowValues,
    prior: &[OpResult],
) -> Result<i64> {
    match (path, values) {
        (ResourcePath::Movies, RowValues::Movie(v)) => {
            // INSERT OR REPLACE keeps db_id unique the sqlite way: the old
            // row is deleted first, which cascades away its stale children.
            let stmt = Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "INSERT OR REPLACE INTO movies \
                 (db_id, title, release_date, vote_average, plot, poster, backdrop) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                [
                    v.db_id.into(),
                    v.title.into(),
                    v.release_date.into(),
                    v.vote_average.into(),
                    v.overview.into(),
                    v.poster_path.into(),
                    v.backdrop_path.into(),
                ],
            );
            let res = conn.execute(stmt).await?;
            Ok(res.last_insert_id() as i64)
        }
        (ResourcePath::Reviews, RowValues::Review(v)) => {
            let movie_id = resolve_parent(v.parent, prior)?;
            let model = review::ActiveModel {
                id: Default::default(),
                movie_id: Set(movie_id),
                author: Set(v.author),
                content: Set(v.content),
                url: Set(v.url),
            };
            let res = review::Entity::insert(model).exec(conn).await?;
            Ok(res.last_insert_id)
        }
        (ResourcePath::Videos, RowValues::Video(v)) => {
            let movie_id = resolve_parent(v.parent, prior)?;
            let model = video::ActiveModel {
                id: Default::default(),
                movie_id: Set(movie_id),
                name: Set(v.name),
                key: Set(v.key),
                site: Set(v.site),
                size: Set(v.size),
                kind: Set(v.kind),
            };
            let res = video::Entity::insert(model).exec(conn).await?;
            Ok(res.last_insert_id)
        }
        (path, values) => Err(Error::PathMismatch { path, detail: values.kind() }),
    }
}

async fn update_row<C: ConnectionTrait>(
    conn: &C,
    path: ResourcePath,
    values: RowValues,
) -> Result<u64> {
    match (path, values) {
        (ResourcePath::Movie(row_id), RowValues::Movie(v)) => {
            let model = movie::ActiveModel {
                id: Default::default(),
                db_id: Set(v.db_id),
                title: Set(v.title),
                release_date: Set(v.release_date),
                vote_average: Set(v.vote_average),
                overview: Set(v.overview),
                poster_path: Set(v.poster_path),
                backdrop_path: Set(v.backdrop_path),
            };
            let res = movie::Entity::update_many()
                .set(model)
                .filter(movie::Column::Id.eq(row_id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
        (path, values) => Err(Error::PathMismatch { path, detail: values.kind() }),
    }
}

async fn delete_rows<C: ConnectionTrait>(
    conn: &C,
    path: ResourcePath,
    owner: Option<ParentRef>,
    prior: &[OpResult],
) -> Result<u64> {
    match (path, owner) {
        (ResourcePath::Movie(row_id), None) => {
            let res =
                movie::Entity::delete_many().filter(movie::Column::Id.eq(row_id)).exec(conn).await?;
            Ok(res.rows_affected)
        }
        (ResourcePath::MovieByDbId(db_id), None) => {
            let res = movie::Entity::delete_many()
                .filter(movie::Column::DbId.eq(db_id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
        (ResourcePath::Movies, None) => {
            let res = movie::Entity::delete_many().exec(conn).await?;
            Ok(res.rows_affected)
        }
        (ResourcePath::Reviews, Some(parent)) => {
            let movie_id = resolve_parent(parent, prior)?;
            let res = review::Entity::delete_many()
                .filter(review::Column::MovieId.eq(movie_id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
        (ResourcePath::Videos, Some(parent)) => {
            let movie_id = resolve_parent(parent, prior)?;
            let res = video::Entity::delete_many()
                .filter(video::Column::MovieId.eq(movie_id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
        (path, Some(_)) => Err(Error::PathMismatch { path, detail: "owner-filtered delete" }),
        (path, None) => Err(Error::PathMismatch { path, detail: "unfiltered delete" }),
    }
}

fn resolve_parent(parent: ParentRef, prior: &[OpResult]) -> Result<i64> {
    match parent {
        ParentRef::Row(row_id) => Ok(row_id),
        ParentRef::BackRef(step) => match prior.get(step) {
            Some(OpResult::Inserted { row_id }) => Ok(*row_id),
            _ => Err(Error::BadBackRef { step }),
        },
    }
}

fn movie_from_entity(model: movie::Model) -> Movie {
    Movie {
        row_id: Some(model.id),
        db_id: model.db_id,
        title: model.title,
        overview: model.overview,
        release_date: model.release_date.as_deref().and_then(|s| s.parse().ok()),
        poster_path: model.poster_path,
        backdrop_path: model.backdrop_path,
        vote_average: model.vote_average,
        genres: Vec::new(),
        reviews: Vec::new(),
        videos: Vec::new(),
        children_loaded: false,
    }
}
