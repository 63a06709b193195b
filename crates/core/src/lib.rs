pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod generator;
pub mod templates;
pub mod validation;

pub use catalog::{CapabilitySchema, Catalog, Operation};
pub use domain::element::{Element, Irdi, ValueSet, ValueType, PRICE_ID_SHORTS};
pub use domain::message::{
    DataElements, Frame, Identification, Message, MessageType, Participant,
    SubmodelIdentification, SubmodelInstance,
};
pub use errors::DomainError;
pub use generator::{
    Clock, ConversationIdSource, GenerateRequest, MessageGenerator, SystemClock,
    UuidConversationIds, DEFAULT_REPLY_MINUTES,
};
pub use templates::TemplateRegistry;
pub use validation::{evaluate, Evaluation, FailureKind, ValueFailure};
