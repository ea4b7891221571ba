pub mod seatmap;
pub mod pricing;
pub mod board;

pub use seatmap::{normalize, LegCatalog, SeatCatalog, SeatLayout};
pub use pricing::{class_price, quote, FareQuote};
pub use board::{CatalogBoard, CatalogError, CatalogLoader, LegSlot};
