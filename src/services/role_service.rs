use uuid::Uuid;

use crate::{
    auth::{
        Role,
        policy::{RoleCapabilities, capability_table},
    },
    db::dao::{DaoBase, RoleDao},
    db::entities::role,
    error::AppError,
};

#[derive(Clone)]
pub struct RoleService {
    role_dao: RoleDao,
}

impl RoleService {
    pub fn new(role_dao: RoleDao) -> Self {
        Self { role_dao }
    }

    /// Inserts one reference row per [`Role`] when the table is empty.
    /// Returns how many rows were written.
    pub async fn seed_defaults(&self) -> Result<usize, AppError> {
        if self.role_dao.count().await? > 0 {
            return Ok(0);
        }
        for role in Role::ALL {
            self.role_dao.insert_role(role).await?;
        }
        tracing::info!(count = Role::ALL.len(), "seeded role table");
        Ok(Role::ALL.len())
    }

    pub async fn list(&self) -> Result<Vec<role::Model>, AppError> {
        Ok(self.role_dao.list_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<role::Model, AppError> {
        Ok(self.role_dao.find_by_id(id).await?)
    }

    pub fn capabilities(&self) -> Vec<RoleCapabilities> {
        capability_table()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{
        auth::Role,
        db::entities::role,
        services::ServiceContext,
        test_helpers::ts,
    };

    fn role_row(role: Role) -> role::Model {
        role::Model {
            id: Uuid::new_v4(),
            created_at: ts(),
            updated_at: ts(),
            is_deleted: false,
            name: role.as_str().to_string(),
            description: role.description().to_string(),
            role_value: role.value(),
            is_active: true,
        }
    }

    fn count_row(count: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(count)))])
    }

    #[tokio::test]
    async fn seeds_every_role_into_empty_table() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results(Role::ALL.map(|role| [role_row(role)]))
            .into_connection();
        let service = ServiceContext::new(&db).role();

        let seeded = service.seed_defaults().await.expect("seed should succeed");
        assert_eq!(seeded, 4);
    }

    #[tokio::test]
    async fn skips_seeding_when_rows_exist() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(4)]])
            .into_connection();
        let service = ServiceContext::new(&db).role();

        assert_eq!(service.seed_defaults().await.expect("seed"), 0);
    }

    #[test]
    fn capability_table_covers_every_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let table = ServiceContext::new(&db).role().capabilities();
        assert_eq!(table.len(), Role::ALL.len());
    }
}
