pub mod aerosol;
pub mod temporal;

pub use aerosol::{aerosol_stack, remove_aerosols, AerosolFilterOutput, AerosolFilterParams};
pub use temporal::{compute_mean_and_median, TemporalStatistics};
