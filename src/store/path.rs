use std::fmt;

/// Addressable resources in the local store.
///
/// Paths are the unit mutations and change notifications are keyed on:
/// `movies` is the saved-movies collection, `movies/{rowid}` one row in it,
/// `movies/db_id/{dbid}` the same row looked up by its remote catalog id and
/// `movies/{rowid}/full` the row joined with its child reviews and videos.
/// Child rows have collection paths of their own but are only ever addressed
/// through an owner filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourcePath {
    Movies,
    Movie(i64),
    MovieByDbId(i64),
    MovieFull(i64),
    Reviews,
    Videos,
}

impl ResourcePath {
    pub fn parse(input: &str) -> Option<Self> {
        let segments: Vec<&str> = input.split('/').collect();
        match segments.as_slice() {
            ["movies"] => Some(ResourcePath::Movies),
            ["movies", row_id] => row_id.parse().ok().map(ResourcePath::Movie),
            ["movies", "db_id", db_id] => db_id.parse().ok().map(ResourcePath::MovieByDbId),
            ["movies", row_id, "full"] => row_id.parse().ok().map(ResourcePath::MovieFull),
            ["reviews"] => Some(ResourcePath::Reviews),
            ["videos"] => Some(ResourcePath::Videos),
            _ => None,
        }
    }

    /// Collection a change at this path dirties; listeners match on this.
    pub fn collection(self) -> ResourcePath {
        match self {
            ResourcePath::Movies
            | ResourcePath::Movie(_)
            | ResourcePath::MovieByDbId(_)
            | ResourcePath::MovieFull(_) => ResourcePath::Movies,
            ResourcePath::Reviews => ResourcePath::Reviews,
            ResourcePath::Videos => ResourcePath::Videos,
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePath::Movies => write!(f, "movies"),
            ResourcePath::Movie(row_id) => write!(f, "movies/{row_id}"),
            ResourcePath::MovieByDbId(db_id) => write!(f, "movies/db_id/{db_id}"),
            ResourcePath::MovieFull(row_id) => write!(f, "movies/{row_id}/full"),
            ResourcePath::Reviews => write!(f, "reviews"),
            ResourcePath::Videos => write!(f, "videos"),
        }
    }
}
