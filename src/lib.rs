//! Offline-capable movie catalog browsing.
//!
//! The pieces, bottom up: a sqlite [`store`] holding saved movies with their
//! reviews and videos, addressed by [`store::ResourcePath`] and mutated
//! through atomic batches; a [`tmdb`] client for the remote catalog;
//! [`repo::CatalogRepo`] tying the two together for the favorite /
//! unfavorite / refresh flows; and two list front-ends, the infinite-scroll
//! [`browse::BrowseList`] over the remote catalog and the live
//! [`favorites::FavoritesList`] over the store. Both push [`signal`] events
//! at whatever view hosts them.
//!
//! An embedder wires it up roughly like this: load [`config::Config`],
//! open the database with [`db::connect_and_migrate`], wrap it in a
//! [`store::Store`], build a [`tmdb::TmdbClient`] and a
//! [`repo::CatalogRepo`] on top, read the startup sort from
//! [`prefs::SortPrefs`] and hand everything to the two lists.

pub mod browse;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod favorites;
pub mod models;
pub mod prefs;
pub mod repo;
pub mod signal;
pub mod store;
pub mod tmdb;

pub use browse::{BrowseList, ListEntry, LoadState, SortOutcome};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use favorites::FavoritesList;
pub use models::{Movie, MovieDetail, Page, Review, SortBy, Video};
pub use prefs::SortPrefs;
pub use repo::{CatalogRepo, SyncReport};
pub use signal::{ListSignal, RetryAction};
pub use store::{Store, StoreChange};
pub use tmdb::{RemoteCatalog, TmdbClient};
