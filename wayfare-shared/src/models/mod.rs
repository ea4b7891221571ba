pub mod events;

pub use events::{SagaEvent, SagaEventKind};
