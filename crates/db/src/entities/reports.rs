//! `SeaORM` Entity for reports table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An issued grading report, looked up by `report_no` during verification.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub report_no: String,
    pub style_number: String,
    pub description: String,
    pub shape_and_cut: String,
    pub total_est_weight: String,
    pub color: String,
    pub clarity: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub important_notice: Option<String>,
    pub report_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
