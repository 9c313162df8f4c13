mod cooldown;
pub mod verification_flow;
