mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{memory_repo, sample_movie};
use reelstash::{
    FavoritesList, ListSignal,
    signal::{self, SignalReceiver},
    store::{ParentRef, ResourcePath, ReviewValues, RowValues},
};
use tokio::time::timeout;

async fn expect_items_changed(rx: &mut SignalReceiver) {
    let signal = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("signal within deadline")
        .expect("signal channel open");
    assert_eq!(signal, ListSignal::ItemsChanged);
}

#[tokio::test]
async fn live_requery_tracks_store_changes() {
    let (repo, _) = memory_repo().await;
    let (tx, mut rx) = signal::channel();
    let list = Arc::new(FavoritesList::new(repo.clone(), tx));
    let watcher = list.attach();

    expect_items_changed(&mut rx).await;
    assert!(list.movies().is_empty());

    let row_id = repo.favorite(&sample_movie(550, "Fight Club")).await.unwrap();
    expect_items_changed(&mut rx).await;
    let movies = list.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].row_id, Some(row_id));
    assert_eq!(movies[0].db_id, 550);

    repo.unfavorite(row_id).await.unwrap();
    expect_items_changed(&mut rx).await;
    assert!(list.movies().is_empty());

    watcher.abort();
}

#[tokio::test]
async fn ignores_unrelated_collections() {
    let (repo, _) = memory_repo().await;
    let (tx, mut rx) = signal::channel();
    let list = Arc::new(FavoritesList::new(repo.clone(), tx));
    let watcher = list.attach();

    expect_items_changed(&mut rx).await;
    let row_id = repo.favorite(&sample_movie(550, "Fight Club")).await.unwrap();
    expect_items_changed(&mut rx).await;

    // a child-only write never touches the movies collection
    repo.store()
        .insert(
            ResourcePath::Reviews,
            RowValues::Review(ReviewValues {
                parent: ParentRef::Row(row_id),
                author: "ada".to_string(),
                content: "late addendum".to_string(),
                url: None,
            }),
        )
        .await
        .unwrap();

    assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    assert_eq!(list.movies().len(), 1);

    watcher.abort();
}

#[tokio::test]
async fn refresh_lists_favorites_in_insertion_order() {
    let (repo, _) = memory_repo().await;
    let (tx, mut rx) = signal::channel();
    let list = FavoritesList::new(repo.clone(), tx);

    repo.favorite(&sample_movie(603, "The Matrix")).await.unwrap();
    repo.favorite(&sample_movie(550, "Fight Club")).await.unwrap();

    list.refresh().await;
    expect_items_changed(&mut rx).await;

    let db_ids: Vec<i64> = list.movies().iter().map(|m| m.db_id).collect();
    assert_eq!(db_ids, [603, 550]);
}

#[tokio::test]
async fn selecting_the_same_movie_twice_is_a_no_op() {
    let (repo, _) = memory_repo().await;
    let (tx, _rx) = signal::channel();
    let list = FavoritesList::new(repo, tx);

    assert_eq!(list.selected(), None);
    assert!(list.select(550));
    assert!(!list.select(550));
    assert_eq!(list.selected(), Some(550));

    assert!(list.select(603));
    assert_eq!(list.selected(), Some(603));

    list.clear_selection();
    assert_eq!(list.selected(), None);
    assert!(list.select(550));
}
