pub mod hex;
pub mod map;
pub mod star_system;

pub use hex::{Feature, FeatureWeights, Hex};
pub use map::GalaxyMap;
pub use star_system::StarSystem;
