pub mod export;
pub mod walk;

pub use export::export_json;
pub use walk::scan;
