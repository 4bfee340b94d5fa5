use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::{entities::pref, error::Result, models::SortBy};

const SORT_KEY: &str = "sort_index";

/// Persisted UI choices, keyed strings in the `prefs` table.
#[derive(Clone)]
pub struct SortPrefs {
    db: DatabaseConnection,
}

impl SortPrefs {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Last selected sort, or the default when never written or unreadable.
    pub async fn load(&self) -> Result<SortBy> {
        let row = pref::Entity::find_by_id(SORT_KEY.to_string()).one(&self.db).await?;
        Ok(row
            .and_then(|r| r.value.parse::<i32>().ok())
            .and_then(SortBy::from_index)
            .unwrap_or(SortBy::Popularity))
    }

    pub async fn save(&self, sort: SortBy) -> Result<()> {
        let model = pref::ActiveModel {
            key: Set(SORT_KEY.to_string()),
            value: Set(sort.as_index().to_string()),
        };

        pref::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(pref::Column::Key)
                    .update_columns([pref::Column::Value])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
