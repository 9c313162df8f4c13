//! # otpflow - Sign-up Verification Flow
//!
//! This is a facade crate that re-exports all public APIs from the verification flow components.
//! Use this crate to get access to the whole email → one-time code → verified flow in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! otpflow = { path = "../otpflow" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `OtpCode`, `CodeEntry`, `VerificationSession`, etc.
//! - **Collaborator traits**: `NotificationSender`, `CodeVerifier`
//! - **Controller**: `VerificationFlowController` - drives one session through the flow
//! - **Adapters**: `HttpOtpClient`, `InMemoryOtpBackend`, `Settings`

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use otpflow_core::*;
}

// Re-export most commonly used core types at the root level
pub use otpflow_core::{
    CODE_LENGTH, CodeEntry, Email, ErrorKind, FlowError, FlowStep, OtpCode, SessionId,
    VerificationSession,
};

// ============================================================================
// Collaborator Traits (Ports)
// ============================================================================

/// Collaborator trait definitions
pub mod ports {
    pub use otpflow_core::{
        CodeVerifier, NotificationSender, SendError, VerifyError, VerifyOutcome,
    };
}

pub use otpflow_core::{CodeVerifier, NotificationSender, SendError, VerifyError, VerifyOutcome};

// ============================================================================
// Controller (Application Layer)
// ============================================================================

pub use otpflow_application::{
    DEFAULT_RESEND_COOLDOWN_SECS, FlowOptions, VerificationFlowController,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Collaborator implementations
    pub mod backend {
        pub use otpflow_adapters::backend::*;
    }

    /// Configuration
    pub mod config {
        pub use otpflow_adapters::config::*;
    }

    pub use otpflow_adapters::telemetry::init_tracing;
}

pub use otpflow_adapters::{
    backend::{HttpOtpClient, InMemoryOtpBackend},
    config::Settings,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing collaborator traits
pub use async_trait::async_trait;

/// Re-export secrecy for reading one-time codes
pub use secrecy::{ExposeSecret, Secret};
