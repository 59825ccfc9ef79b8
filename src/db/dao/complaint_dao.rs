use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{complaint, prelude::Complaint};

#[derive(Clone)]
pub struct ComplaintDao {
    db: DatabaseConnection,
}

impl DaoBase for ComplaintDao {
    type Entity = Complaint;
    const LABEL: &'static str = "Complaint";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub tenant_id: Uuid,
    pub pg_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl ComplaintDao {
    pub async fn create_complaint(&self, new: NewComplaint) -> DaoResult<complaint::Model> {
        let model = complaint::ActiveModel {
            tenant_id: Set(new.tenant_id),
            pg_id: Set(new.pg_id),
            title: Set(new.title),
            description: Set(new.description),
            status: Set(new.status),
            assigned_to: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> DaoResult<Vec<complaint::Model>> {
        self.find_iter(None, None, move |query| {
            query.filter(complaint::Column::TenantId.eq(tenant_id))
        })
        .collect_all()
        .await
    }

    pub async fn list_for_pg(&self, pg_id: Uuid) -> DaoResult<Vec<complaint::Model>> {
        self.find_iter(None, None, move |query| {
            query.filter(complaint::Column::PgId.eq(pg_id))
        })
        .collect_all()
        .await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<complaint::Model>> {
        self.find_iter(None, None, |query| query).collect_all().await
    }

    pub async fn update_handling(
        &self,
        id: Uuid,
        status: Option<String>,
        assigned_to: Option<Uuid>,
    ) -> DaoResult<complaint::Model> {
        self.update(id, move |active| {
            if let Some(status) = status {
                active.status = Set(status);
            }
            if let Some(assignee) = assigned_to {
                active.assigned_to = Set(Some(assignee));
            }
        })
        .await
    }
}
