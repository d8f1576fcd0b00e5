pub mod format;

pub use format::group_detail_value;
