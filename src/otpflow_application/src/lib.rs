pub mod controller;

pub use controller::verification_flow::{
    DEFAULT_RESEND_COOLDOWN_SECS, FlowOptions, VerificationFlowController,
};
