use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    models::{Movie, MovieDetail, Page, Review, SortBy, Video},
};

/// Read access to the remote movie catalog. The list and detail flows only
/// see this trait, so tests can drive them with canned catalogs.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn fetch_page(&self, page: u32, sort: SortBy) -> Result<Page<Movie>>;
    async fn fetch_detail(&self, db_id: i64) -> Result<MovieDetail>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        let limiter =
            Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps.max(1)).unwrap())));
        Self { client, api_key, base_url, limiter }
    }
}

#[async_trait]
impl RemoteCatalog for TmdbClient {
    async fn fetch_page(&self, page: u32, sort: SortBy) -> Result<Page<Movie>> {
        let Some(sort_by) = sort.remote_param() else {
            return Err(Error::Constraint("favorite sort is local-only".to_string()));
        };

        self.limiter.until_ready().await;

        let url = format!("{}/discover/movie", self.base_url.trim_end_matches('/'));
        debug!(page = page, sort = sort_by, "fetching catalog page");

        let resp: DiscoverResponse = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("sort_by", sort_by)])
            .query(&[("page", page)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Page {
            items: resp.results.into_iter().map(MovieDto::into_movie).collect(),
            page: resp.page,
            total_pages: resp.total_pages,
        })
    }

    async fn fetch_detail(&self, db_id: i64) -> Result<MovieDetail> {
        self.limiter.until_ready().await;

        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), db_id);
        debug!(db_id = db_id, "fetching movie detail");

        let resp: DetailResponse = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "reviews,videos"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.into_detail())
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    page: u32,
    total_pages: u32,
    results: Vec<MovieDto>,
}

#[derive(Debug, Deserialize)]
struct MovieDto {
    id: i64,
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
}

impl MovieDto {
    fn into_movie(self) -> Movie {
        Movie {
            row_id: None,
            db_id: self.id,
            title: self.title,
            overview: self.overview.filter(|s| !s.is_empty()),
            release_date: self
                .release_date
                .as_deref()
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse().ok()),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average,
            genres: Vec::new(),
            reviews: Vec::new(),
            videos: Vec::new(),
            children_loaded: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(flatten)]
    movie: MovieDto,
    #[serde(default)]
    genres: Vec<GenreDto>,
    #[serde(default)]
    reviews: ReviewsDto,
    #[serde(default)]
    videos: VideosDto,
}

impl DetailResponse {
    fn into_detail(self) -> MovieDetail {
        MovieDetail {
            movie: self.movie.into_movie(),
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            reviews: Page {
                items: self.reviews.results.into_iter().map(ReviewDto::into_review).collect(),
                page: self.reviews.page.max(1),
                total_pages: self.reviews.total_pages.max(1),
            },
            videos: self.videos.results.into_iter().map(VideoDto::into_video).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreDto {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewsDto {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    results: Vec<ReviewDto>,
}

#[derive(Debug, Deserialize)]
struct ReviewDto {
    author: String,
    content: String,
    #[serde(default)]
    url: Option<String>,
}

impl ReviewDto {
    fn into_review(self) -> Review {
        Review { author: self.author, content: self.content, url: self.url }
    }
}

#[derive(Debug, Default, Deserialize)]
struct VideosDto {
    #[serde(default)]
    results: Vec<VideoDto>,
}

#[derive(Debug, Deserialize)]
struct VideoDto {
    name: String,
    key: String,
    site: String,
    #[serde(default)]
    size: i32,
    #[serde(rename = "type")]
    kind: String,
}

impl VideoDto {
    fn into_video(self) -> Video {
        Video { name: self.name, key: self.key, site: self.site, size: self.size, kind: self.kind }
    }
}
