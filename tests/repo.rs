mod common;

use common::{memory_repo, sample_detail, sample_movie, sample_review, sample_video};
use reelstash::{Error, ErrorKind, SyncReport, entities::{movie, review, video}, store::ResourcePath};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn favorite_saves_movie_with_children() {
    let (repo, _) = memory_repo().await;

    let saved = sample_detail(
        sample_movie(550, "Fight Club"),
        vec![sample_review("ada"), sample_review("brian")],
        vec![
            sample_video("Trailer", "YouTube"),
            sample_video("Teaser", "youtube"),
            sample_video("Featurette", "Vimeo"),
        ],
    )
    .into_movie();

    let row_id = repo.favorite(&saved).await.unwrap();

    let db = repo.store().db();
    let movies = movie::Entity::find().all(db).await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].id, row_id);
    assert_eq!(movies[0].db_id, 550);

    let reviews = review::Entity::find().all(db).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews.iter().all(|r| r.movie_id == row_id));
    let authors: Vec<&str> = reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, ["ada", "brian"]);

    // the Vimeo featurette never makes it into the store
    let videos = video::Entity::find().all(db).await.unwrap();
    assert_eq!(videos.len(), 2);
    assert!(videos.iter().all(|v| v.movie_id == row_id));
    let names: Vec<&str> = videos.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Trailer", "Teaser"]);
}

#[tokio::test]
async fn is_favorited_reflects_store() {
    let (repo, _) = memory_repo().await;

    assert_eq!(repo.is_favorited(550).await.unwrap(), None);

    let row_id = repo.favorite(&sample_movie(550, "Fight Club")).await.unwrap();
    assert_eq!(repo.is_favorited(550).await.unwrap(), Some(row_id));
    assert_eq!(repo.is_favorited(603).await.unwrap(), None);

    assert_eq!(repo.unfavorite(row_id).await.unwrap(), 1);
    assert_eq!(repo.is_favorited(550).await.unwrap(), None);
}

#[tokio::test]
async fn unfavorite_removes_children() {
    let (repo, _) = memory_repo().await;

    let saved = sample_detail(
        sample_movie(550, "Fight Club"),
        vec![sample_review("ada")],
        vec![sample_video("Trailer", "YouTube")],
    )
    .into_movie();
    let row_id = repo.favorite(&saved).await.unwrap();

    assert_eq!(repo.unfavorite(row_id).await.unwrap(), 1);

    let db = repo.store().db();
    assert_eq!(movie::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(review::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(video::Entity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn refresh_favorite_replaces_children_in_place() {
    let (repo, _) = memory_repo().await;

    let saved = sample_detail(
        sample_movie(550, "Fight Club"),
        vec![sample_review("ada"), sample_review("brian")],
        vec![sample_video("Trailer", "YouTube"), sample_video("Teaser", "YouTube")],
    )
    .into_movie();
    let row_id = repo.favorite(&saved).await.unwrap();

    let fresh = sample_detail(
        sample_movie(550, "Fight Club (Remastered)"),
        vec![],
        vec![sample_video("New Trailer", "YouTube"), sample_video("BTS", "Vimeo")],
    );
    repo.refresh_favorite(&fresh, row_id).await.unwrap();

    let db = repo.store().db();
    let movies = movie::Entity::find().all(db).await.unwrap();
    assert_eq!(movies.len(), 1);
    // update keeps the row id, unlike a re-favorite
    assert_eq!(movies[0].id, row_id);
    assert_eq!(movies[0].title, "Fight Club (Remastered)");

    assert_eq!(review::Entity::find().count(db).await.unwrap(), 0);
    let videos = video::Entity::find().all(db).await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].name, "New Trailer");
    assert_eq!(videos[0].movie_id, row_id);
}

#[tokio::test]
async fn load_favorite_detail_assembles_children() {
    let (repo, _) = memory_repo().await;

    let saved = sample_detail(
        sample_movie(550, "Fight Club"),
        vec![sample_review("ada"), sample_review("brian")],
        vec![sample_video("Trailer", "YouTube"), sample_video("Teaser", "YouTube")],
    )
    .into_movie();
    let row_id = repo.favorite(&saved).await.unwrap();

    let loaded = repo.load_favorite_detail(row_id).await.unwrap();
    assert_eq!(loaded.row_id, Some(row_id));
    assert_eq!(loaded.db_id, 550);
    assert_eq!(loaded.title, "Fight Club");
    assert!(loaded.children_loaded);

    let authors: Vec<&str> = loaded.reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, ["ada", "brian"]);
    let names: Vec<&str> = loaded.videos.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Trailer", "Teaser"]);
}

#[tokio::test]
async fn load_favorite_detail_missing_row_is_not_found() {
    let (repo, _) = memory_repo().await;

    let err = repo.load_favorite_detail(999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, Error::NotFound(ResourcePath::MovieFull(999))));
}

#[tokio::test]
async fn favorites_list_in_insertion_order() {
    let (repo, _) = memory_repo().await;

    repo.favorite(&sample_movie(603, "The Matrix")).await.unwrap();
    repo.favorite(&sample_movie(550, "Fight Club")).await.unwrap();

    let favorites = repo.favorites().await.unwrap();
    let db_ids: Vec<i64> = favorites.iter().map(|m| m.db_id).collect();
    assert_eq!(db_ids, [603, 550]);
    assert!(favorites.iter().all(|m| m.row_id.is_some()));
}

#[tokio::test]
async fn sync_favorites_reports_partial_success() {
    let (repo, stub) = memory_repo().await;

    let row_fc = repo
        .favorite(
            &sample_detail(
                sample_movie(550, "Fight Club"),
                vec![sample_review("ada")],
                vec![],
            )
            .into_movie(),
        )
        .await
        .unwrap();
    let row_mx = repo.favorite(&sample_movie(603, "The Matrix")).await.unwrap();

    // only 550 has a detail planned; 603 will fail and be skipped
    stub.plan_detail(sample_detail(
        sample_movie(550, "Fight Club (Synced)"),
        vec![sample_review("colin")],
        vec![sample_video("Trailer", "YouTube")],
    ));

    let report = repo.sync_favorites(4).await.unwrap();
    assert_eq!(report, SyncReport { total: 2, refreshed: 1 });

    let synced = repo.load_favorite_detail(row_fc).await.unwrap();
    assert_eq!(synced.title, "Fight Club (Synced)");
    let authors: Vec<&str> = synced.reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, ["colin"]);
    assert_eq!(synced.videos.len(), 1);

    let untouched = repo.store().movie_by_row(row_mx).await.unwrap().unwrap();
    assert_eq!(untouched.title, "The Matrix");
}
