use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, msg};

/// Basic email format validation.
///
/// Intentionally permissive: exactly one @, non-empty local part, domain
/// with at least one dot. Not RFC 5322, just a sanity check before storage.
pub(crate) fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(AppError::BadRequest(msg::EMAIL_EMPTY.into()));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || local.contains(' ') {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }
    if domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::BadRequest(msg::PASSWORD_TOO_SHORT.into()));
    }
    Ok(())
}

/// Application role. Authorization is static role-list membership:
/// all roles can read; STAC and PROYECTO can edit vigencias; only STAC
/// manages users, clients, products and links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Stac,
    Proyecto,
    Comercial,
    System,
}

impl Role {
    /// Every authenticated role may read.
    pub fn can_read(&self) -> bool {
        true
    }

    /// Limited edit: vigencia lifecycle management.
    pub fn can_edit_vigencias(&self) -> bool {
        matches!(self, Role::Stac | Role::Proyecto)
    }

    /// Full edit: users, clients, products and client-product links.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Stac)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Stac => "STAC",
            Role::Proyecto => "PROYECTO",
            Role::Comercial => "COMERCIAL",
            Role::System => "SYSTEM",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "STAC" => Ok(Role::Stac),
            "PROYECTO" => Ok(Role::Proyecto),
            "COMERCIAL" => Ok(Role::Comercial),
            "SYSTEM" => Ok(Role::System),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application user. The password hash never leaves the queries layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl CreateUser {
    pub fn validate(&self) -> Result<()> {
        validate_email_format(&self.email)?;
        validate_password(&self.password)?;
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    /// Admin-set password replacement.
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref email) = self.email {
            validate_email_format(email)?;
        }
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
            }
        }
        if let Some(ref password) = self.password {
            validate_password(password)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.active.is_none()
            && self.password.is_none()
    }
}

/// Active bearer session for a user.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: i64,
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gates() {
        assert!(Role::Stac.is_admin());
        assert!(Role::Stac.can_edit_vigencias());
        assert!(Role::Proyecto.can_edit_vigencias());
        assert!(!Role::Proyecto.is_admin());
        assert!(!Role::Comercial.can_edit_vigencias());
        assert!(Role::Comercial.can_read());
        assert!(Role::System.can_read());
        assert!(!Role::System.can_edit_vigencias());
    }

    #[test]
    fn test_role_string_roundtrip() {
        for role in [Role::Stac, Role::Proyecto, Role::Comercial, Role::System] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn test_create_user_validation() {
        let input = CreateUser {
            email: "ops@example.com".into(),
            password: "longenough".into(),
            name: "Ops".into(),
            role: Role::Stac,
        };
        assert!(input.validate().is_ok());

        let bad_email = CreateUser {
            email: "not-an-email".into(),
            ..shallow_clone(&input)
        };
        assert!(bad_email.validate().is_err());

        let short_pw = CreateUser {
            password: "short".into(),
            ..shallow_clone(&input)
        };
        assert!(short_pw.validate().is_err());
    }

    fn shallow_clone(input: &CreateUser) -> CreateUser {
        CreateUser {
            email: input.email.clone(),
            password: input.password.clone(),
            name: input.name.clone(),
            role: input.role,
        }
    }
}
