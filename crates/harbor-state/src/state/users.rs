//! Staff accounts and role names.
//!
//! Roles are labels only; nothing here decides what a role may do.

use harbor_core::validation::{validate_email, validate_required};
use harbor_core::{CoreError, RecordStatus, User, ValidationError};
use tracing::{debug, info};

use super::{id_or_new, upsert_by_id, AppState, StateResult};

impl AppState {
    // =========================================================================
    // Users
    // =========================================================================

    /// Creates or updates a user. `lastLogin` is never taken from the caller.
    pub fn save_user(&mut self, mut user: User) -> StateResult<User> {
        user.name = validate_required("name", &user.name)?.to_string();
        user.email = validate_email(&user.email)?.to_string();
        user.role = self.require_role(&user.role)?.to_string();
        for outlet_id in &user.outlet_ids {
            self.require_outlet(outlet_id)?;
        }
        user.id = id_or_new(&user.id);

        let taken = self
            .users
            .iter()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: user.email,
            }
            .into());
        }

        user.last_login = self
            .users
            .iter()
            .find(|u| u.id == user.id)
            .and_then(|u| u.last_login);

        upsert_by_id(&mut self.users, user.clone(), |u| &u.id);
        info!(user_id = %user.id, role = %user.role, "User saved");
        Ok(user)
    }

    /// Deactivates a user; the record stays for history.
    pub fn delete_user(&mut self, id: &str) -> StateResult<User> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| CoreError::not_found("User", id))?;

        user.status = RecordStatus::Inactive;
        info!(user_id = %id, "User deactivated");
        Ok(user.clone())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Adds a role name. Saving a name that exists (any case) changes nothing.
    pub fn save_role(&mut self, name: &str) -> StateResult<&[String]> {
        let name = validate_required("role", name)?;
        if self.roles.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            debug!(role = %name, "Role already exists");
        } else {
            self.roles.push(name.to_string());
            info!(role = %name, "Role added");
        }
        Ok(&self.roles)
    }

    /// Removes a role name no Active user holds.
    pub fn delete_role(&mut self, name: &str) -> StateResult<&[String]> {
        let role = self.require_role(name)?.to_string();
        let holders = self
            .users
            .iter()
            .filter(|u| u.status == RecordStatus::Active && u.role == role)
            .count();
        if holders > 0 {
            return Err(CoreError::invalid_state(
                "Role",
                &role,
                format!("assigned to {} active user(s)", holders),
            )
            .into());
        }

        self.roles.retain(|r| *r != role);
        info!(role = %role, "Role deleted");
        Ok(&self.roles)
    }

    /// The stored spelling of a role name, matched without case.
    fn require_role(&self, name: &str) -> StateResult<&str> {
        let name = validate_required("role", name)?;
        self.roles
            .iter()
            .find(|r| r.eq_ignore_ascii_case(name))
            .map(String::as_str)
            .ok_or_else(|| CoreError::not_found("Role", name).into())
    }
}
