use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::element::{Element, Irdi};

/// The six negotiation message kinds. Wire tags are camelCase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    CallForProposal,
    Proposal,
    AcceptProposal,
    RejectProposal,
    InformConfirm,
    InformPayment,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        MessageType::CallForProposal,
        MessageType::Proposal,
        MessageType::AcceptProposal,
        MessageType::RejectProposal,
        MessageType::InformConfirm,
        MessageType::InformPayment,
    ];

    /// Parses a wire tag. Unrecognized tags yield `None`; the caller decides
    /// how to report that.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "callForProposal" => Some(Self::CallForProposal),
            "proposal" => Some(Self::Proposal),
            "acceptProposal" => Some(Self::AcceptProposal),
            "rejectProposal" => Some(Self::RejectProposal),
            "informConfirm" => Some(Self::InformConfirm),
            "informPayment" => Some(Self::InformPayment),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::CallForProposal => "callForProposal",
            Self::Proposal => "proposal",
            Self::AcceptProposal => "acceptProposal",
            Self::RejectProposal => "rejectProposal",
            Self::InformConfirm => "informConfirm",
            Self::InformPayment => "informPayment",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub identification: Identification,
}

/// Envelope portion of a message: identity, timing, and conversation
/// metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub sender: Participant,
    #[serde(default)]
    pub receiver: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_by: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmodelIdentification {
    pub id: Irdi,
    #[serde(default)]
    pub submodel_elements: Vec<Element>,
}

/// Payload structure binding a capability's elements to concrete values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmodelInstance {
    pub identification: SubmodelIdentification,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataElements {
    #[serde(default)]
    pub submodels: Vec<SubmodelInstance>,
}

/// A negotiation message. Fields the protocol does not model explicitly
/// (sensor readings, decentralized-identity tokens, ...) survive round trips
/// in the `extensions` bag and take precedence when a conversation is
/// continued.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub frame: Frame,
    #[serde(default)]
    pub data_elements: DataElements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Message {
    /// The bound elements of the first (and per protocol, only) submodel
    /// instance, if any.
    pub fn payload_elements(&self) -> Option<&[Element]> {
        self.data_elements
            .submodels
            .first()
            .map(|instance| instance.identification.submodel_elements.as_slice())
    }
}
