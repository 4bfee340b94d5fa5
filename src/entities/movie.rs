use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub db_id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    #[sea_orm(column_name = "plot")]
    pub overview: Option<String>,
    #[sea_orm(column_name = "poster")]
    pub poster_path: Option<String>,
    #[sea_orm(column_name = "backdrop")]
    pub backdrop_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::video::Entity")]
    Videos,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
