pub mod benchmark;
pub mod store;

pub use benchmark::{read_benchmark, write_benchmark, BenchmarkMetadata, BENCHMARK_KEY};
pub use store::{MemoryStore, MetadataDoc, MetadataStore, SidecarStore};
