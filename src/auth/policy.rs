//! Role capability table.
//!
//! Every authorization decision in the API goes through [`allows`] or one of
//! the `check_*` helpers below; handlers never compare roles directly.

use serde::Serialize;
use uuid::Uuid;

use super::{Claims, Role};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CreatePg,
    ListPgs,
    UpdatePg,
    DeletePg,
    CreateRoom,
    UpdateRoom,
    DeleteRoom,
    CreateUser,
    ListUsers,
    UpdateUser,
    DeleteUser,
    FileComplaint,
    ManageComplaints,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Capability::CreatePg,
        Capability::ListPgs,
        Capability::UpdatePg,
        Capability::DeletePg,
        Capability::CreateRoom,
        Capability::UpdateRoom,
        Capability::DeleteRoom,
        Capability::CreateUser,
        Capability::ListUsers,
        Capability::UpdateUser,
        Capability::DeleteUser,
        Capability::FileComplaint,
        Capability::ManageComplaints,
    ];
}

pub const fn allows(role: Role, capability: Capability) -> bool {
    use Capability::*;

    match role {
        Role::SuperAdmin => !matches!(capability, FileComplaint),
        Role::PgAdmin => matches!(
            capability,
            CreatePg
                | ListPgs
                | UpdatePg
                | CreateRoom
                | UpdateRoom
                | DeleteRoom
                | CreateUser
                | ListUsers
                | UpdateUser
                | ManageComplaints
        ),
        Role::Staff => matches!(capability, CreateRoom | UpdateRoom | ManageComplaints),
        Role::Tenant => matches!(capability, FileComplaint),
    }
}

pub fn require(role: Role, capability: Capability) -> Result<(), AppError> {
    if allows(role, capability) {
        Ok(())
    } else {
        Err(AppError::unauthorized(
            "You do not have permission to perform this action",
        ))
    }
}

/// Roles an actor may hand out when creating a user.
pub fn creatable_roles(role: Role) -> &'static [Role] {
    match role {
        Role::SuperAdmin => &[Role::PgAdmin],
        Role::PgAdmin => &[Role::Staff, Role::Tenant],
        Role::Staff | Role::Tenant => &[],
    }
}

/// The caller of an operation: role from the verified claims, PG from the
/// stored user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub pg_id: Option<Uuid>,
}

impl Actor {
    pub fn new(id: Uuid, role: Role, pg_id: Option<Uuid>) -> Self {
        Self { id, role, pg_id }
    }

    pub fn from_claims(claims: &Claims, pg_id: Option<Uuid>) -> Result<Self, AppError> {
        let id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject"))?;
        Ok(Self::new(id, claims.role, pg_id))
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn same_pg(&self, pg_id: Option<Uuid>) -> bool {
        self.pg_id.is_some() && self.pg_id == pg_id
    }
}

/// Validates a create-user request and returns the PG the new user belongs to.
pub fn check_create_user(
    actor: &Actor,
    requested_role: Role,
    requested_pg: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    match actor.role {
        Role::SuperAdmin => {
            if requested_role != Role::PgAdmin {
                return Err(AppError::unauthorized(
                    "SuperAdmin can only create PGAdmin users",
                ));
            }
            Ok(requested_pg)
        }
        Role::PgAdmin => {
            if !creatable_roles(Role::PgAdmin).contains(&requested_role) {
                return Err(AppError::unauthorized(
                    "PGAdmin can only create Staff and Tenant users",
                ));
            }
            match actor.pg_id {
                Some(pg_id) => Ok(Some(pg_id)),
                None => Err(AppError::bad_request("PGAdmin must be associated with a PG")),
            }
        }
        Role::Staff | Role::Tenant => Err(AppError::unauthorized(
            "You do not have permission to create users",
        )),
    }
}

pub fn check_update_user(
    actor: &Actor,
    target_pg: Option<Uuid>,
    new_role: Option<Role>,
    new_pg: Option<Uuid>,
) -> Result<(), AppError> {
    match actor.role {
        Role::SuperAdmin => Ok(()),
        Role::PgAdmin => {
            if !actor.same_pg(target_pg) {
                return Err(AppError::unauthorized("You can only update users in your PG"));
            }
            if matches!(new_role, Some(Role::SuperAdmin | Role::PgAdmin)) {
                return Err(AppError::unauthorized("You cannot assign this role"));
            }
            if new_pg.is_some() && new_pg != actor.pg_id {
                return Err(AppError::unauthorized("You can only update users in your PG"));
            }
            Ok(())
        }
        Role::Staff | Role::Tenant => Err(AppError::unauthorized(
            "You do not have permission to update users",
        )),
    }
}

pub fn check_delete_user(actor: &Actor, target_role: Role) -> Result<(), AppError> {
    if actor.role != Role::SuperAdmin {
        return Err(AppError::unauthorized("Only SuperAdmin can delete users"));
    }
    if target_role == Role::SuperAdmin {
        return Err(AppError::bad_request("Cannot delete SuperAdmin user"));
    }
    Ok(())
}

/// PG-scoped check for PGAdmin actors; other roles pass through to the table.
pub fn check_pg_scope(actor: &Actor, pg_id: Uuid) -> Result<(), AppError> {
    if actor.role == Role::PgAdmin && !actor.same_pg(Some(pg_id)) {
        return Err(AppError::unauthorized("You can only manage your own PG"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCapabilities {
    pub role: Role,
    pub role_value: i32,
    pub capabilities: Vec<Capability>,
    pub creatable_roles: &'static [Role],
}

pub fn capability_table() -> Vec<RoleCapabilities> {
    Role::ALL
        .into_iter()
        .map(|role| RoleCapabilities {
            role,
            role_value: role.value(),
            capabilities: Capability::ALL
                .into_iter()
                .filter(|capability| allows(role, *capability))
                .collect(),
            creatable_roles: creatable_roles(role),
        })
        .collect()
}
