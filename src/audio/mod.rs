pub mod analysis;
pub mod decode;
pub mod energy;
pub mod features;
pub mod onset;
pub mod tempo;
