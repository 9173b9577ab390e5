//! Prefixed ID generation for Vigencias entities.
//!
//! All IDs use a `vg_` brand prefix so identifiers are self-describing in
//! logs and API payloads.
//!
//! Format: `vg_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// Entity types that have prefixed IDs.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    User,
    Client,
    Product,
    ClientProduct,
    Vigencia,
    Session,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "vg_usr",
            Self::Client => "vg_cli",
            Self::Product => "vg_prod",
            Self::ClientProduct => "vg_lnk",
            Self::Vigencia => "vg_vig",
            Self::Session => "vg_ses",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let id = EntityType::User.gen_id();
        assert!(id.starts_with("vg_usr_"));
        // vg_usr_ (7 chars) + 32 hex chars = 39 chars total
        assert_eq!(id.len(), 39);
    }

    #[test]
    fn test_ids_are_unique() {
        let id1 = EntityType::Vigencia.gen_id();
        let id2 = EntityType::Vigencia.gen_id();
        assert_ne!(id1, id2);
    }
}
