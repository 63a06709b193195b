use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use parley_core::catalog::{CapabilitySchema, Catalog, Operation};
use parley_core::config::DataConfig;
use parley_core::domain::element::Irdi;
use parley_core::domain::message::{Message, MessageType};
use parley_core::templates::TemplateRegistry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read data file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse data file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("message skeleton for `{tag}` was not found at `{path}`")]
    MissingTemplate { tag: &'static str, path: PathBuf },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| StoreError::ReadFile { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| StoreError::ParseFile { path: path.to_path_buf(), source })
}

/// Loads the capability catalog and its operations listing. Both files are
/// read once; the returned catalog is immutable.
pub fn load_catalog(catalog_path: &Path, operations_path: &Path) -> Result<Catalog, StoreError> {
    let capabilities: BTreeMap<Irdi, CapabilitySchema> = read_json(catalog_path)?;
    let operations: Vec<Operation> = read_json(operations_path)?;

    info!(
        event_name = "store.catalog.loaded",
        capabilities = capabilities.len(),
        operations = operations.len(),
        path = %catalog_path.display(),
        "capability catalog loaded"
    );

    Ok(Catalog::new(capabilities, operations))
}

/// Loads the six message skeletons from `<dir>/<tag>.json`. Every kind must
/// be present; a partial template set is a configuration mistake, not
/// something to paper over at generation time.
pub fn load_templates(dir: &Path) -> Result<TemplateRegistry, StoreError> {
    let mut skeletons = Vec::with_capacity(MessageType::ALL.len());
    for kind in MessageType::ALL {
        let path = dir.join(format!("{}.json", kind.tag()));
        if !path.exists() {
            return Err(StoreError::MissingTemplate { tag: kind.tag(), path });
        }
        let skeleton: Message = read_json(&path)?;
        skeletons.push((kind, skeleton));
    }

    info!(
        event_name = "store.templates.loaded",
        count = skeletons.len(),
        dir = %dir.display(),
        "message skeletons loaded"
    );

    Ok(TemplateRegistry::new(skeletons))
}

/// Compiled-in default skeletons, used when no template directory is
/// configured.
pub fn embedded_templates() -> Result<TemplateRegistry, StoreError> {
    const EMBEDDED: [(MessageType, &str); 6] = [
        (MessageType::CallForProposal, include_str!("../data/templates/callForProposal.json")),
        (MessageType::Proposal, include_str!("../data/templates/proposal.json")),
        (MessageType::AcceptProposal, include_str!("../data/templates/acceptProposal.json")),
        (MessageType::RejectProposal, include_str!("../data/templates/rejectProposal.json")),
        (MessageType::InformConfirm, include_str!("../data/templates/informConfirm.json")),
        (MessageType::InformPayment, include_str!("../data/templates/informPayment.json")),
    ];

    let mut skeletons = Vec::with_capacity(EMBEDDED.len());
    for (kind, raw) in EMBEDDED {
        let skeleton: Message = serde_json::from_str(raw).map_err(|source| {
            StoreError::ParseFile {
                path: PathBuf::from(format!("<embedded>/{}.json", kind.tag())),
                source,
            }
        })?;
        skeletons.push((kind, skeleton));
    }

    Ok(TemplateRegistry::new(skeletons))
}

/// Loads everything the generator needs according to `data`: the catalog,
/// the operations listing, and either the configured template directory or
/// the embedded skeletons.
pub fn load(data: &DataConfig) -> Result<(Catalog, TemplateRegistry), StoreError> {
    let catalog = load_catalog(&data.catalog_path, &data.operations_path)?;
    let templates = match &data.templates_dir {
        Some(dir) => load_templates(dir)?,
        None => embedded_templates()?,
    };
    Ok((catalog, templates))
}
