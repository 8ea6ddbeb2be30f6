use diesel::sqlite::SqliteConnection;

use crate::sip::sip_errors::Result;
use crate::sip::sip_model::{
    MandateStats, NewSipMandate, ReconcileOutcome, ReconcileRequest, SipMandate, SipMandateUpdate,
    SipStatus,
};

/// Trait defining the contract for SIP mandate repository implementations
pub trait SipRepositoryTrait: Send + Sync {
    fn get_mandate(&self, mandate_id: &str) -> Result<SipMandate>;
    fn get_mandates(&self, account_name: Option<&str>) -> Result<Vec<SipMandate>>;
    fn create_mandate(&self, new_mandate: NewSipMandate) -> Result<SipMandate>;
    fn update_mandate(&self, update: SipMandateUpdate) -> Result<SipMandate>;
    fn set_status_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        mandate_id: &str,
        status: SipStatus,
    ) -> Result<SipMandate>;
    fn delete_in_transaction(&self, conn: &mut SqliteConnection, mandate_id: &str) -> Result<()>;
    fn rename_account_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize>;
    fn count_for_account(&self, account_name: &str) -> Result<i64>;
}

/// Trait defining the contract for SIP mandate service implementations
pub trait SipServiceTrait: Send + Sync {
    fn get_mandate(&self, mandate_id: &str) -> crate::errors::Result<SipMandate>;
    fn list_mandates(&self, account_name: Option<&str>) -> crate::errors::Result<Vec<SipMandate>>;
    fn create_mandate(&self, new_mandate: NewSipMandate) -> crate::errors::Result<SipMandate>;
    fn update_mandate(&self, update: SipMandateUpdate) -> crate::errors::Result<SipMandate>;
    fn delete_mandate(
        &self,
        mandate_id: &str,
        delete_transactions: bool,
    ) -> crate::errors::Result<usize>;
    fn get_mandate_stats(&self, mandate_id: &str) -> crate::errors::Result<MandateStats>;
    fn list_mandate_stats(
        &self,
        account_name: Option<&str>,
    ) -> crate::errors::Result<Vec<MandateStats>>;
    fn reconcile_mandate(
        &self,
        request: ReconcileRequest,
    ) -> crate::errors::Result<ReconcileOutcome>;
    fn convert_to_lumpsum(&self, mandate_id: &str) -> crate::errors::Result<usize>;
}
