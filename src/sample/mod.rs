pub mod item;
pub mod manifest;
pub mod sampler;

pub use item::SampleItem;
pub use manifest::{read_manifest, write_manifest};
pub use sampler::{stratified_sample, SampleSet};
