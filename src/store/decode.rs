use sea_orm::FromQueryResult;

use crate::models::{Movie, Review, Video};

/// One flattened row of the movie/reviews/videos join. Child columns are
/// nullable because either join side can come up empty.
#[derive(Clone, Debug, FromQueryResult)]
pub struct MovieChildRow {
    pub row_id: i64,
    pub db_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub plot: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub review_id: Option<i64>,
    pub review_author: Option<String>,
    pub review_content: Option<String>,
    pub review_url: Option<String>,
    pub video_id: Option<i64>,
    pub video_name: Option<String>,
    pub video_key: Option<String>,
    pub video_site: Option<String>,
    pub video_size: Option<i32>,
    pub video_kind: Option<String>,
}

/// Rebuilds one movie with its children from flattened join rows.
///
/// Scalars come from the first row; every row after that repeats them. Child
/// ids arrive in ascending order, so a child is appended only when its id is
/// strictly greater than the last one taken on that side. That drops the
/// repeats a one-to-many-squared join produces while keeping each child
/// exactly once, whatever mix of row shapes the join emitted.
pub fn assemble(rows: &[MovieChildRow]) -> Option<Movie> {
    let first = rows.first()?;
    let mut movie = Movie {
        row_id: Some(first.row_id),
        db_id: first.db_id,
        title: first.title.clone(),
        overview: first.plot.clone(),
        release_date: first.release_date.as_deref().and_then(|s| s.parse().ok()),
        poster_path: first.poster.clone(),
        backdrop_path: first.backdrop.clone(),
        vote_average: first.vote_average,
        genres: Vec::new(),
        reviews: Vec::new(),
        videos: Vec::new(),
        children_loaded: true,
    };

    let mut last_review_id = 0;
    let mut last_video_id = 0;
    for row in rows {
        if let Some(id) = row.review_id {
            if id > last_review_id {
                movie.reviews.push(Review {
                    author: row.review_author.clone().unwrap_or_default(),
                    content: row.review_content.clone().unwrap_or_default(),
                    url: row.review_url.clone(),
                });
                last_review_id = id;
            }
        }
        if let Some(id) = row.video_id {
            if id > last_video_id {
                movie.videos.push(Video {
                    name: row.video_name.clone().unwrap_or_default(),
                    key: row.video_key.clone().unwrap_or_default(),
                    site: row.video_site.clone().unwrap_or_default(),
                    size: row.video_size.unwrap_or(0),
                    kind: row.video_kind.clone().unwrap_or_default(),
                });
                last_video_id = id;
            }
        }
    }

    Some(movie)
}
