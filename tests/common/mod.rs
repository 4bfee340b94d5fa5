#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use jiff::civil::Date;
use reelstash::{
    CatalogRepo, Error, Movie, MovieDetail, Page, RemoteCatalog, Result, Review, SortBy, Store,
    Video, db,
};

/// Programmable stand-in for the remote catalog. Pages and details are
/// planned per key; anything unplanned fails like an outage.
#[derive(Default)]
pub struct StubCatalog {
    pages: Mutex<HashMap<(SortBy, u32), PlannedPage>>,
    details: Mutex<HashMap<i64, MovieDetail>>,
    page_log: Mutex<Vec<(SortBy, u32)>>,
    delay: Mutex<Option<Duration>>,
}

enum PlannedPage {
    Ok(Page<Movie>),
    Fail,
}

impl StubCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn plan_page(&self, sort: SortBy, page: u32, movies: Vec<Movie>, total_pages: u32) {
        self.pages
            .lock()
            .unwrap()
            .insert((sort, page), PlannedPage::Ok(Page { items: movies, page, total_pages }));
    }

    pub fn plan_failure(&self, sort: SortBy, page: u32) {
        self.pages.lock().unwrap().insert((sort, page), PlannedPage::Fail);
    }

    pub fn plan_detail(&self, detail: MovieDetail) {
        self.details.lock().unwrap().insert(detail.movie.db_id, detail);
    }

    /// Makes every fetch sleep first, to hold requests in flight.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn clear_delay(&self) {
        *self.delay.lock().unwrap() = None;
    }

    pub fn page_requests(&self) -> Vec<(SortBy, u32)> {
        self.page_log.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteCatalog for StubCatalog {
    async fn fetch_page(&self, page: u32, sort: SortBy) -> Result<Page<Movie>> {
        self.page_log.lock().unwrap().push((sort, page));
        self.pause().await;
        match self.pages.lock().unwrap().get(&(sort, page)) {
            Some(PlannedPage::Ok(planned)) => Ok(planned.clone()),
            Some(PlannedPage::Fail) => Err(Error::Network("planned outage".to_string())),
            None => Err(Error::Network(format!("no page {page} planned for {sort:?}"))),
        }
    }

    async fn fetch_detail(&self, db_id: i64) -> Result<MovieDetail> {
        self.pause().await;
        match self.details.lock().unwrap().get(&db_id) {
            Some(detail) => Ok(detail.clone()),
            None => Err(Error::Network(format!("no detail planned for {db_id}"))),
        }
    }
}

/// Fresh in-memory repo backed by a stub catalog.
pub async fn memory_repo() -> (CatalogRepo, Arc<StubCatalog>) {
    init_tracing();
    let conn = db::connect_in_memory().await.expect("in-memory database");
    let stub = StubCatalog::new();
    let repo = CatalogRepo::new(Store::new(conn), stub.clone());
    (repo, stub)
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sample_movie(db_id: i64, title: &str) -> Movie {
    Movie {
        row_id: None,
        db_id,
        title: title.to_string(),
        overview: Some(format!("{title} synopsis")),
        release_date: Some(Date::constant(2024, 6, 1)),
        poster_path: Some(format!("/{db_id}.jpg")),
        backdrop_path: None,
        vote_average: 7.1,
        genres: Vec::new(),
        reviews: Vec::new(),
        videos: Vec::new(),
        children_loaded: false,
    }
}

pub fn sample_review(author: &str) -> Review {
    Review {
        author: author.to_string(),
        content: format!("{author} wrote this"),
        url: Some(format!("https://reviews.test/{author}")),
    }
}

pub fn sample_video(name: &str, site: &str) -> Video {
    Video {
        name: name.to_string(),
        key: format!("key-{name}"),
        site: site.to_string(),
        size: 1080,
        kind: "Trailer".to_string(),
    }
}

pub fn sample_detail(movie: Movie, reviews: Vec<Review>, videos: Vec<Video>) -> MovieDetail {
    MovieDetail {
        movie,
        genres: vec!["Drama".to_string()],
        reviews: Page { items: reviews, page: 1, total_pages: 1 },
        videos,
    }
}

/// `count` movies with consecutive ids starting at `start_id`.
pub fn movie_page(start_id: i64, count: usize) -> Vec<Movie> {
    (0..count as i64).map(|i| sample_movie(start_id + i, &format!("Movie {}", start_id + i))).collect()
}
