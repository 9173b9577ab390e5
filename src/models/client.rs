use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, msg};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub primary_contact: Option<String>,
    pub description: Option<String>,
    /// Link to the client's system-information page, if any.
    pub system_information_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Client joined with the name of the user who registered it.
#[derive(Debug, Clone, Serialize)]
pub struct ClientWithCreator {
    #[serde(flatten)]
    pub client: Client,
    pub created_by_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub primary_contact: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub system_information_url: Option<String>,
}

impl CreateClient {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
        }
        if let Some(ref email) = self.email {
            super::validate_email_format(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub primary_contact: Option<String>,
    pub description: Option<String>,
    pub system_information_url: Option<String>,
}

impl UpdateClient {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
            }
        }
        if let Some(ref email) = self.email {
            super::validate_email_format(email)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.primary_contact.is_none()
            && self.description.is_none()
            && self.system_information_url.is_none()
    }
}
