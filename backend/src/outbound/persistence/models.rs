//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Conversion into domain types happens in the repositories.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    auth_tokens, contract_gardens, contracts, garden_plants, gardens, plants, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Profile changeset; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub digest: &'a str,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contracts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContractRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub level: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contracts)]
pub(crate) struct NewContractRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub name_folded: &'a str,
    pub description: &'a str,
    pub level: i16,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = gardens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GardenRow {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub level: i16,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = gardens)]
pub(crate) struct NewGardenRow<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
    pub level: i16,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = gardens)]
pub(crate) struct GardenUpdate<'a> {
    pub name: Option<&'a str>,
    pub level: Option<i16>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlantRow {
    pub id: i64,
    pub garden_id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub soil_moisture: i32,
    pub fertilizer_rate: i32,
    pub height: i32,
    pub stem_count: i32,
    pub health_score: i32,
    pub is_present: bool,
    pub soil_cohesion: i32,
    pub disease_index: i32,
    pub insect_density: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plants)]
pub(crate) struct NewPlantRow<'a> {
    pub garden_id: i64,
    pub user_id: Uuid,
    pub name: &'a str,
    pub soil_moisture: i32,
    pub fertilizer_rate: i32,
    pub height: i32,
    pub stem_count: i32,
    pub health_score: i32,
    pub is_present: bool,
    pub soil_cohesion: i32,
    pub disease_index: i32,
    pub insect_density: i32,
}

/// Plant changeset; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plants)]
pub(crate) struct PlantUpdate<'a> {
    pub name: Option<&'a str>,
    pub soil_moisture: Option<i32>,
    pub fertilizer_rate: Option<i32>,
    pub height: Option<i32>,
    pub stem_count: Option<i32>,
    pub health_score: Option<i32>,
    pub is_present: Option<bool>,
    pub soil_cohesion: Option<i32>,
    pub disease_index: Option<i32>,
    pub insect_density: Option<i32>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = contract_gardens)]
pub(crate) struct ContractGardenLink {
    pub contract_id: Uuid,
    pub garden_id: i64,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = garden_plants)]
pub(crate) struct GardenPlantLink {
    pub garden_id: i64,
    pub plant_id: i64,
}
