pub mod io;
pub mod normalize;
pub mod percentile;

pub use io::{decode_raw, load_raw, save_png};
pub use normalize::{normalize, NormalizedImage, RawImage, TargetSize, DEFAULT_EPSILON};
pub use percentile::percentile;
