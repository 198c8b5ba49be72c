pub mod bdl;
pub mod flags;
pub mod range;
pub mod records;
pub mod result;
pub mod status;
pub mod thresholds;
