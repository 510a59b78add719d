// Decision-engine services

pub mod clearance_service;
pub mod compliance_service;
pub mod load_service;
pub mod recovery_service;
pub mod restriction_service;
pub mod risk_service;
pub mod substitution_service;

pub use clearance_service::ClearanceService;
pub use compliance_service::{ComplianceCheckResult, ComplianceService};
pub use load_service::LoadService;
pub use recovery_service::RecoveryService;
pub use restriction_service::RestrictionService;
pub use risk_service::RiskService;
pub use substitution_service::SubstitutionService;
