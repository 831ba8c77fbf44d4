pub mod csv;
pub mod io;

pub use csv::{parse_table, Table};
pub use io::{read_table, write_table};
