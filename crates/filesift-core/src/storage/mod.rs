pub mod dataset;

pub use dataset::DatasetStorage;
