use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{user_service::UserService, validation::FieldErrors};
use crate::{
    auth::{
        Role,
        policy::{self, Actor, Capability},
    },
    db::dao::{ComplaintDao, DaoBase, NewComplaint},
    db::entities::complaint,
    error::AppError,
};

const TITLE_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "InProgress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    pub status: Option<ComplaintStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Clone)]
pub struct ComplaintService {
    complaint_dao: ComplaintDao,
    users: UserService,
}

impl ComplaintService {
    pub fn new(complaint_dao: ComplaintDao, users: UserService) -> Self {
        Self {
            complaint_dao,
            users,
        }
    }

    /// Files a complaint for the calling tenant against the PG they live in.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateComplaintRequest,
    ) -> Result<complaint::Model, AppError> {
        policy::require(actor.role, Capability::FileComplaint)?;
        FieldErrors::new()
            .required("Title", &request.title)
            .max_len("Title", &request.title, TITLE_MAX)
            .required("Description", &request.description)
            .max_len("Description", &request.description, DESCRIPTION_MAX)
            .finish()?;

        let complaint = self
            .complaint_dao
            .create_complaint(NewComplaint {
                tenant_id: actor.id,
                pg_id: actor.pg_id,
                title: request.title.trim().to_string(),
                description: request.description.trim().to_string(),
                status: ComplaintStatus::Pending.to_string(),
            })
            .await?;
        tracing::info!(complaint_id = %complaint.id, tenant_id = %actor.id, "complaint filed");
        Ok(complaint)
    }

    pub async fn my(&self, actor: &Actor) -> Result<Vec<complaint::Model>, AppError> {
        if actor.role != Role::Tenant {
            return Err(AppError::unauthorized(
                "Only tenants have their own complaints",
            ));
        }
        Ok(self.complaint_dao.list_for_tenant(actor.id).await?)
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<complaint::Model>, AppError> {
        if actor.is_super_admin() {
            return Ok(self.complaint_dao.list_all().await?);
        }
        policy::require(actor.role, Capability::ManageComplaints)?;
        match actor.pg_id {
            Some(pg_id) => Ok(self.complaint_dao.list_for_pg(pg_id).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateComplaintRequest,
    ) -> Result<complaint::Model, AppError> {
        policy::require(actor.role, Capability::ManageComplaints)?;
        let existing = self.complaint_dao.find_by_id(id).await?;
        if !actor.is_super_admin() && !actor.same_pg(existing.pg_id) {
            return Err(AppError::unauthorized(
                "You can only manage complaints in your PG",
            ));
        }

        if let Some(assignee_id) = request.assigned_to {
            let assignee = self
                .users
                .find_by_id(&assignee_id)
                .await?
                .ok_or_else(|| AppError::bad_request("Assignee does not exist"))?;
            let handles_complaints = assignee
                .role()
                .is_some_and(|role| matches!(role, Role::PgAdmin | Role::Staff));
            if !handles_complaints || assignee.pg_id != existing.pg_id {
                return Err(AppError::bad_request(
                    "Complaints can only be assigned to staff of the same PG",
                ));
            }
        }

        Ok(self
            .complaint_dao
            .update_handling(
                id,
                request.status.map(|status| status.to_string()),
                request.assigned_to,
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::{ComplaintStatus, CreateComplaintRequest, UpdateComplaintRequest};
    use crate::{
        auth::{Role, policy::Actor},
        error::AppError,
        services::ServiceContext,
        test_helpers::{complaint_model, user_model},
    };

    #[tokio::test]
    async fn tenant_complaint_carries_their_pg() {
        let tenant = Uuid::new_v4();
        let pg = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[complaint_model(Uuid::new_v4(), tenant, Some(pg))]])
            .into_connection();
        let service = ServiceContext::new(&db).complaint();

        let complaint = service
            .create(
                &Actor::new(tenant, Role::Tenant, Some(pg)),
                CreateComplaintRequest {
                    title: "Leaking tap".to_string(),
                    description: "Bathroom tap leaks at night".to_string(),
                },
            )
            .await
            .expect("create should succeed");
        assert_eq!(complaint.pg_id, Some(pg));
        assert_eq!(complaint.status, "Pending");
    }

    #[tokio::test]
    async fn staff_cannot_file_complaints() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ServiceContext::new(&db).complaint();

        let err = service
            .create(
                &Actor::new(Uuid::new_v4(), Role::Staff, Some(Uuid::new_v4())),
                CreateComplaintRequest {
                    title: "t".to_string(),
                    description: "d".to_string(),
                },
            )
            .await
            .expect_err("staff denied");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_together() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ServiceContext::new(&db).complaint();

        let err = service
            .create(
                &Actor::new(Uuid::new_v4(), Role::Tenant, None),
                CreateComplaintRequest {
                    title: " ".to_string(),
                    description: String::new(),
                },
            )
            .await
            .expect_err("validation");
        assert_eq!(err.message(), "Title is required; Description is required");
    }

    #[tokio::test]
    async fn staff_without_pg_sees_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ServiceContext::new(&db).complaint();

        let complaints = service
            .list(&Actor::new(Uuid::new_v4(), Role::Staff, None))
            .await
            .expect("list should succeed");
        assert!(complaints.is_empty());
    }

    #[tokio::test]
    async fn staff_cannot_update_complaint_of_other_pg() {
        let complaint_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[complaint_model(
                complaint_id,
                Uuid::new_v4(),
                Some(Uuid::new_v4()),
            )]])
            .into_connection();
        let service = ServiceContext::new(&db).complaint();

        let err = service
            .update(
                &Actor::new(Uuid::new_v4(), Role::Staff, Some(Uuid::new_v4())),
                complaint_id,
                UpdateComplaintRequest {
                    status: Some(ComplaintStatus::Resolved),
                    assigned_to: None,
                },
            )
            .await
            .expect_err("foreign pg");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn assignee_must_be_staff_of_same_pg() {
        let complaint_id = Uuid::new_v4();
        let pg = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[complaint_model(complaint_id, tenant, Some(pg))]])
            .append_query_results([[user_model(tenant, "tenant@example.com", Role::Tenant, Some(pg))]])
            .into_connection();
        let service = ServiceContext::new(&db).complaint();

        let err = service
            .update(
                &Actor::new(Uuid::new_v4(), Role::PgAdmin, Some(pg)),
                complaint_id,
                UpdateComplaintRequest {
                    status: None,
                    assigned_to: Some(tenant),
                },
            )
            .await
            .expect_err("tenant cannot be assignee");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn status_serializes_as_name() {
        assert_eq!(
            serde_json::to_value(ComplaintStatus::InProgress).expect("serialize"),
            serde_json::json!("InProgress")
        );
        let parsed: ComplaintStatus = serde_json::from_str("\"Closed\"").expect("deserialize");
        assert_eq!(parsed, ComplaintStatus::Closed);
    }
}
