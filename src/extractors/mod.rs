pub mod page;
pub mod payload;

pub use page::PageQuery;
pub use payload::Payload;
