use parley_core::Catalog;

use super::CommandResult;

pub fn run(catalog: &Catalog) -> CommandResult {
    CommandResult::payload(&catalog.operations())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use parley_core::{Catalog, Irdi, Operation};

    #[test]
    fn lists_the_catalog_operations_as_json() {
        let catalog = Catalog::new(
            BTreeMap::new(),
            vec![Operation { irdi: Irdi::from("0173-1#01-AKJ975#017"), label: "Drilling".to_owned() }],
        );

        let result = super::run(&catalog);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("Drilling"));
        assert!(result.output.contains("0173-1#01-AKJ975#017"));
    }
}
