//! Payment records and the derived balance view

pub mod model;
pub mod service;

pub use model::{
    Payment, PaymentFilter, PaymentMethod, PaymentPatch, PaymentStatus, PaymentSummary,
    PaymentType, RecordPaymentRequest, UpdatePaymentRequest,
};
pub use service::PaymentService;
