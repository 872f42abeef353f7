pub mod csv_table;
pub mod html_table;
pub mod number;

pub use csv_table::{parse_bilateral_csv, parse_item_csv};
pub use html_table::{parse_bilateral_table, parse_item_table};
pub use number::NumberFormat;
