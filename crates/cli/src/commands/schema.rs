use parley_core::{Catalog, Irdi};

use super::CommandResult;

pub fn run(catalog: &Catalog, irdi: &str) -> CommandResult {
    match catalog.schema_for(&Irdi::from(irdi)) {
        Ok(schema) => CommandResult::payload(&schema),
        Err(error) => CommandResult::failure("schema", "catalog_not_found", error.to_string(), 1),
    }
}
