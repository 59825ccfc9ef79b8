//! Response bodies. Models are never serialized directly so that columns
//! like `password_hash` and `is_deleted` stay private.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::Role,
    db::entities::{complaint, pg, role, room, user},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    pub role_value: i32,
    pub is_active: bool,
    pub pg_id: Option<Uuid>,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserView {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            role: model.role(),
            role_value: model.role,
            email: model.email,
            is_active: model.is_active,
            pg_id: model.pg_id,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PgView {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<pg::Model> for PgView {
    fn from(model: pg::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: Uuid,
    pub pg_id: Uuid,
    pub room_number: String,
    pub capacity: i32,
    pub occupied_beds: i32,
    pub available_beds: i32,
    pub is_available: bool,
    pub room_type: Option<String>,
    pub price: Option<f64>,
    pub floor_number: Option<i32>,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

impl From<room::Model> for RoomView {
    fn from(model: room::Model) -> Self {
        Self {
            id: model.id,
            pg_id: model.pg_id,
            available_beds: (model.capacity - model.occupied_beds).max(0),
            room_number: model.room_number,
            capacity: model.capacity,
            occupied_beds: model.occupied_beds,
            is_available: model.is_available,
            room_type: model.room_type,
            price: model.price,
            floor_number: model.floor_number,
            description: model.description,
            amenities: string_list(model.amenities),
            images: string_list(model.images),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub pg_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<complaint::Model> for ComplaintView {
    fn from(model: complaint::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            pg_id: model.pg_id,
            title: model.title,
            description: model.description,
            status: model.status,
            assigned_to: model.assigned_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub role_value: i32,
    pub is_active: bool,
}

impl From<role::Model> for RoleView {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            role_value: model.role_value,
            is_active: model.is_active,
        }
    }
}

pub fn collect<M, V: From<M>>(models: Vec<M>) -> Vec<V> {
    models.into_iter().map(V::from).collect()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{RoomView, UserView};
    use crate::{
        auth::Role,
        test_helpers::{room_model, user_model},
    };

    #[test]
    fn user_view_hides_password_hash() {
        let view = UserView::from(user_model(Uuid::new_v4(), "a@b.io", Role::Staff, None));
        let json = serde_json::to_value(view).expect("serialize");
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "Staff");
        assert_eq!(json["roleValue"], 3);
    }

    #[test]
    fn room_view_reports_free_beds() {
        let mut model = room_model(Uuid::new_v4(), Uuid::new_v4(), "101");
        model.occupied_beds = 1;
        let view = RoomView::from(model);
        assert_eq!(view.available_beds, 2);
        assert_eq!(view.amenities, vec!["wifi".to_string()]);
    }
}
