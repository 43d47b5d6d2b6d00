#[cfg(feature = "python")]
pub mod python;
