pub mod calibration;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod polarimetry;
pub mod stack;
