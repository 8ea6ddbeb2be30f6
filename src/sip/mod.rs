pub(crate) mod reconciler;
pub(crate) mod sip_errors;
pub(crate) mod sip_model;
pub(crate) mod sip_repository;
pub(crate) mod sip_service;
pub(crate) mod sip_traits;

pub use reconciler::plan_reconciliation;
pub use sip_errors::SipError;
pub use sip_model::{
    BuyEdit, MandateStats, NewSipMandate, ReconcileOutcome, ReconcilePlan, ReconcileRequest,
    SipMandate, SipMandateUpdate, SipStatus,
};
pub use sip_repository::SipRepository;
pub use sip_service::SipService;
pub use sip_traits::{SipRepositoryTrait, SipServiceTrait};
