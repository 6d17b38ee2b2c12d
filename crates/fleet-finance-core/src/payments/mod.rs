pub mod allocation;
pub mod compute;
pub mod corrections;
pub mod engine;

pub use allocation::AllocationStrategy;
pub use compute::{effective_roi_percentage, gross_roi, net_payable, round_money};
pub use corrections::{apply_correction, PaymentCorrection};
pub use engine::{EngineConfig, GenerationFailure, GenerationReport, PaymentEngine};
