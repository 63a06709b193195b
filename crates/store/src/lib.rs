pub mod loader;

pub use loader::{embedded_templates, load, load_catalog, load_templates, StoreError};
