mod ssamap;

pub use ssamap::SSAMap;
