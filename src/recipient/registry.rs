//! Recipient Registry
//!
//! Administrative writes (register, edit, verify, deactivate) and public
//! reads. Received totals are never touched here; they belong to the
//! settlement and allocation paths.

use std::sync::Arc;

use tracing::info;

use super::error::RecipientError;
use super::types::{Recipient, RecipientProfile, VerificationStatus};
use crate::core_types::{ActorId, RecipientId};
use crate::store::LedgerStore;

#[derive(Debug, Clone)]
pub struct RecipientRegistry {
    store: Arc<dyn LedgerStore>,
}

impl RecipientRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Register a new recipient. Requires a real performing actor.
    pub async fn register(
        &self,
        profile: RecipientProfile,
        created_by: ActorId,
    ) -> Result<Recipient, RecipientError> {
        let recipient = Recipient::new(profile, created_by)?;
        self.store.insert_recipient(&recipient).await?;
        info!(
            recipient_id = %recipient.id,
            full_name = %recipient.profile.full_name,
            created_by = %created_by,
            "Recipient registered"
        );
        Ok(recipient)
    }

    pub async fn get(&self, id: RecipientId) -> Result<Recipient, RecipientError> {
        self.store
            .recipient(id)
            .await?
            .ok_or(RecipientError::NotFound(id))
    }

    /// Public listing: active recipients only
    pub async fn list(&self) -> Result<Vec<Recipient>, RecipientError> {
        Ok(self.store.list_recipients(true).await?)
    }

    /// Administrative listing including deactivated recipients
    pub async fn list_all(&self) -> Result<Vec<Recipient>, RecipientError> {
        Ok(self.store.list_recipients(false).await?)
    }

    /// Replace the editable profile after validating it
    pub async fn update_profile(
        &self,
        id: RecipientId,
        profile: RecipientProfile,
        performed_by: ActorId,
    ) -> Result<Recipient, RecipientError> {
        if performed_by.is_nil() {
            return Err(RecipientError::MissingActor);
        }
        profile.validate()?;
        let updated = self
            .store
            .update_recipient_profile(id, profile)
            .await?
            .ok_or(RecipientError::NotFound(id))?;
        info!(recipient_id = %id, performed_by = %performed_by, "Recipient profile updated");
        Ok(updated)
    }

    pub async fn set_verification(
        &self,
        id: RecipientId,
        status: VerificationStatus,
        performed_by: ActorId,
    ) -> Result<Recipient, RecipientError> {
        if performed_by.is_nil() {
            return Err(RecipientError::MissingActor);
        }
        let updated = self
            .store
            .set_recipient_verification(id, status)
            .await?
            .ok_or(RecipientError::NotFound(id))?;
        info!(
            recipient_id = %id,
            status = %status,
            performed_by = %performed_by,
            "Recipient verification updated"
        );
        Ok(updated)
    }

    /// Hide from or restore to public listings. History stays intact either
    /// way; this is the closest thing to deletion the ledger allows.
    pub async fn set_active(
        &self,
        id: RecipientId,
        active: bool,
        performed_by: ActorId,
    ) -> Result<Recipient, RecipientError> {
        if performed_by.is_nil() {
            return Err(RecipientError::MissingActor);
        }
        let updated = self
            .store
            .set_recipient_active(id, active)
            .await?
            .ok_or(RecipientError::NotFound(id))?;
        info!(
            recipient_id = %id,
            active,
            performed_by = %performed_by,
            "Recipient active flag updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedger;

    fn registry() -> RecipientRegistry {
        RecipientRegistry::new(Arc::new(MemoryLedger::new()))
    }

    fn profile() -> RecipientProfile {
        RecipientProfile::new("Peter Kamau", "Street vendor saving toward a kiosk")
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = registry();
        let created = registry.register(profile(), ActorId::new()).await.unwrap();
        let fetched = registry.get(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.verification, VerificationStatus::Pending);
        assert!(fetched.active);
    }

    #[tokio::test]
    async fn test_register_requires_actor() {
        let registry = registry();
        let err = registry.register(profile(), ActorId::nil()).await.unwrap_err();
        assert!(matches!(err, RecipientError::MissingActor));
        assert!(registry.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_writes_require_actor() {
        let registry = registry();
        let created = registry.register(profile(), ActorId::new()).await.unwrap();

        assert!(matches!(
            registry
                .update_profile(created.id, profile(), ActorId::nil())
                .await,
            Err(RecipientError::MissingActor)
        ));
        assert!(matches!(
            registry
                .set_verification(created.id, VerificationStatus::Verified, ActorId::nil())
                .await,
            Err(RecipientError::MissingActor)
        ));
        assert!(matches!(
            registry.set_active(created.id, false, ActorId::nil()).await,
            Err(RecipientError::MissingActor)
        ));

        // fail closed: nothing changed
        let untouched = registry.get(created.id).await.unwrap();
        assert_eq!(untouched.verification, VerificationStatus::Pending);
        assert!(untouched.active);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let registry = registry();
        assert!(matches!(
            registry.get(RecipientId::new()).await,
            Err(RecipientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_profile_validates() {
        let registry = registry();
        let admin = ActorId::new();
        let created = registry.register(profile(), admin).await.unwrap();

        let mut bad = profile();
        bad.full_name = String::new();
        assert!(matches!(
            registry.update_profile(created.id, bad, admin).await,
            Err(RecipientError::BlankName)
        ));

        let mut good = profile();
        good.bio = "Now stocking the kiosk with dry goods".to_string();
        let updated = registry
            .update_profile(created.id, good, admin)
            .await
            .unwrap();
        assert!(updated.profile.bio.starts_with("Now stocking"));

        assert!(matches!(
            registry
                .update_profile(RecipientId::new(), profile(), admin)
                .await,
            Err(RecipientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivation_hides_from_public_listing() {
        let registry = registry();
        let admin = ActorId::new();
        let created = registry.register(profile(), admin).await.unwrap();

        registry
            .set_verification(created.id, VerificationStatus::Verified, admin)
            .await
            .unwrap();
        let hidden = registry
            .set_active(created.id, false, admin)
            .await
            .unwrap();
        assert!(!hidden.active);

        assert!(registry.list().await.unwrap().is_empty());
        let all = registry.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].verification, VerificationStatus::Verified);

        let restored = registry.set_active(created.id, true, admin).await.unwrap();
        assert!(restored.active);
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }
}
