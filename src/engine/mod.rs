pub mod analysis;
pub mod cases;
pub mod evidence;
pub mod notes;
pub mod reports;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::policy::{can_perform, Action};
use crate::schema::users;

/// The acting user for one engine operation. Constructed from a freshly
/// loaded user row so a client-supplied role is never trusted, and passed
/// explicitly into every operation; the engine holds no ambient auth state.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn from_user(user: &User) -> AppResult<Self> {
        if !user.active {
            return Err(AppError::permission("user account is deactivated"));
        }
        let role = Role::parse(&user.role)
            .ok_or_else(|| AppError::internal(format!("unknown role in store: {}", user.role)))?;
        Ok(Actor { id: user.id, role })
    }

    pub fn load(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Self> {
        let user: User = users::table
            .find(user_id)
            .first(conn)
            .optional()?
            .ok_or(AppError::Unauthorized)?;
        Actor::from_user(&user)
    }
}

/// Policy gate shared by every engine operation. A denied action produces
/// no activity and no notification; the denial is only traced.
pub(crate) fn require(actor: &Actor, action: Action) -> AppResult<()> {
    if can_perform(actor.role, action) {
        Ok(())
    } else {
        warn!(
            actor_id = %actor.id,
            role = actor.role.as_str(),
            action = action.as_str(),
            "capability denied"
        );
        Err(AppError::permission(format!(
            "missing capability {}",
            action.as_str()
        )))
    }
}

pub(crate) fn load_active_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    let user: User = users::table
        .find(user_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::validation("user does not exist"))?;
    if !user.active {
        return Err(AppError::validation("user account is deactivated"));
    }
    Ok(user)
}
