// ABOUTME: Utility modules for error handling and pricing
// Shared helpers used across the application

pub mod error;
pub mod pricing;

pub use error::{Result, ThreadChatError};
pub use pricing::{ModelPricing, PriceBand, PricingTable};
