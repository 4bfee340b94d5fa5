use jiff::civil::Date;
use serde::Serialize;

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// List orderings offered to the user. The first three are understood by the
/// remote catalog; `Favorite` is a local pseudo-sort that switches the UI to
/// the saved-movies list and never reaches the network.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum SortBy {
    Popularity,
    ReleaseDate,
    VoteAverage,
    Favorite,
}

impl SortBy {
    pub fn remote_param(self) -> Option<&'static str> {
        match self {
            SortBy::Popularity => Some("popularity.desc"),
            SortBy::ReleaseDate => Some("release_date.desc"),
            SortBy::VoteAverage => Some("vote_average.desc"),
            SortBy::Favorite => None,
        }
    }

    pub fn is_remote(self) -> bool {
        !matches!(self, SortBy::Favorite)
    }

    pub fn as_index(self) -> i32 {
        match self {
            SortBy::Popularity => 0,
            SortBy::ReleaseDate => 1,
            SortBy::VoteAverage => 2,
            SortBy::Favorite => 3,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(SortBy::Popularity),
            1 => Some(SortBy::ReleaseDate),
            2 => Some(SortBy::VoteAverage),
            3 => Some(SortBy::Favorite),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    /// Local store row id; `None` until the movie has been saved.
    pub row_id: Option<i64>,
    /// Remote catalog id, unique per movie.
    pub db_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<Date>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub genres: Vec<String>,
    pub reviews: Vec<Review>,
    pub videos: Vec<Video>,
    /// Whether `reviews` and `videos` have been populated. A movie straight
    /// off a list page has none; a detail fetch or a store join sets this.
    pub children_loaded: bool,
}

impl Movie {
    pub fn poster_url(&self, width: u32) -> Option<String> {
        self.poster_path.as_deref().map(|path| format!("{IMAGE_BASE_URL}/w{width}{path}"))
    }

    pub fn backdrop_url(&self, width: u32) -> Option<String> {
        self.backdrop_path.as_deref().map(|path| format!("{IMAGE_BASE_URL}/w{width}{path}"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Review {
    pub author: String,
    pub content: String,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Video {
    pub name: String,
    pub key: String,
    pub site: String,
    pub size: i32,
    pub kind: String,
}

impl Video {
    pub fn is_youtube(&self) -> bool {
        self.site.eq_ignore_ascii_case("youtube")
    }

    /// Playback link for sites we know how to address.
    pub fn watch_url(&self) -> Option<String> {
        self.is_youtube().then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

/// One page of remote results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}

/// Full record for one movie as served by the remote detail endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieDetail {
    pub movie: Movie,
    pub genres: Vec<String>,
    pub reviews: Page<Review>,
    pub videos: Vec<Video>,
}

impl MovieDetail {
    /// Collapses the detail into a movie with children attached.
    pub fn into_movie(self) -> Movie {
        let mut movie = self.movie;
        movie.genres = self.genres;
        movie.reviews = self.reviews.items;
        movie.videos = self.videos;
        movie.children_loaded = true;
        movie
    }
}
