pub mod coverage;
pub mod pricing;
pub mod profile;
pub mod risk;
