mod category;
mod weights;

pub use category::ViolationCategory;
pub use weights::WeightTable;
