use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::element::{Element, Irdi};
use crate::errors::DomainError;

/// Declared element schema of one capability, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySchema {
    #[serde(default)]
    pub submodel_elements: Vec<Element>,
}

/// One entry of the catalog's operations listing, offered to parties
/// preparing a call for proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub irdi: Irdi,
    pub label: String,
}

/// Read-only capability catalog. Loaded once at startup and shared;
/// never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    capabilities: BTreeMap<Irdi, CapabilitySchema>,
    operations: Vec<Operation>,
}

impl Catalog {
    pub fn new(capabilities: BTreeMap<Irdi, CapabilitySchema>, operations: Vec<Operation>) -> Self {
        Self { capabilities, operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn contains(&self, irdi: &Irdi) -> bool {
        self.capabilities.contains_key(irdi)
    }

    fn capability(&self, irdi: &Irdi) -> Result<&CapabilitySchema, DomainError> {
        self.capabilities
            .get(irdi)
            .ok_or_else(|| DomainError::CatalogNotFound { irdi: irdi.clone() })
    }

    /// Negotiable view of a capability: declaration order preserved, the
    /// price slot excluded. Values are validated and bound against this
    /// view; price is handled only through the generator's override path.
    pub fn schema_for(&self, irdi: &Irdi) -> Result<Vec<Element>, DomainError> {
        Ok(self
            .capability(irdi)?
            .submodel_elements
            .iter()
            .filter(|element| !element.is_price())
            .cloned()
            .collect())
    }

    /// The capability's price slot, unfiltered, if the schema declares one.
    pub fn price_element(&self, irdi: &Irdi) -> Result<Option<Element>, DomainError> {
        Ok(self.capability(irdi)?.submodel_elements.iter().find(|element| element.is_price()).cloned())
    }
}
