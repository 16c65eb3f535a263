pub mod linearize;
pub mod lut;

pub use linearize::linearize;
pub use lut::{lut_filename, LookupTable, LutSet};
