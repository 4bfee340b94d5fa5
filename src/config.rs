use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub database_url: String,
    pub tmdb_rps: u32,
    pub max_page_bound: u32,
    pub sync_concurrency: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let tmdb_api_key = std::env::var("TMDB_API_KEY").context("TMDB_API_KEY")?;
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://reelstash.db?mode=rwc".to_string());

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        // TMDb rejects discover pages past 500
        let max_page_bound: u32 =
            std::env::var("MAX_PAGE_BOUND").ok().and_then(|s| s.parse().ok()).unwrap_or(500);

        let sync_concurrency: usize =
            std::env::var("SYNC_CONCURRENCY").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            database_url,
            tmdb_rps,
            max_page_bound,
            sync_concurrency,
        })
    }
}
