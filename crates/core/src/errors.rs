use thiserror::Error;

use crate::domain::element::Irdi;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("capability `{irdi}` is not present in the catalog")]
    CatalogNotFound { irdi: Irdi },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use crate::domain::element::Irdi;

    use super::DomainError;

    #[test]
    fn catalog_not_found_names_the_identifier() {
        let error = DomainError::CatalogNotFound { irdi: Irdi::from("0173-1#01-AKJ975#017") };
        assert_eq!(
            error.to_string(),
            "capability `0173-1#01-AKJ975#017` is not present in the catalog"
        );
    }
}
