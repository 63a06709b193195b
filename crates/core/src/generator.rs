use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::element::{Irdi, ValueSet};
use crate::domain::message::{Message, MessageType, SubmodelIdentification, SubmodelInstance};
use crate::errors::DomainError;
use crate::templates::TemplateRegistry;
use crate::validation::evaluate;

pub const DEFAULT_REPLY_MINUTES: i64 = 10;

/// Source of opaque conversation identities, one fresh token per call.
pub trait ConversationIdSource: Send + Sync {
    fn mint(&self) -> String;
}

#[derive(Default)]
pub struct UuidConversationIds;

impl ConversationIdSource for UuidConversationIds {
    fn mint(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One message-generation request. `irdi` is only consulted when opening a
/// conversation or overriding a price; `original_message` switches the
/// generator into continuation mode for every kind except call-for-proposal.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    pub message_type: MessageType,
    pub user_id: String,
    pub irdi: Option<Irdi>,
    pub submodel_values: ValueSet,
    pub reply_offset_minutes: Option<i64>,
    pub original_message: Option<Message>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub start_timestamp: Option<DateTime<Utc>>,
    pub end_timestamp: Option<DateTime<Utc>>,
    pub creation_date: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
}

impl GenerateRequest {
    pub fn new(message_type: MessageType, user_id: impl Into<String>) -> Self {
        Self {
            message_type,
            user_id: user_id.into(),
            irdi: None,
            submodel_values: ValueSet::new(),
            reply_offset_minutes: None,
            original_message: None,
            price: None,
            location: None,
            start_timestamp: None,
            end_timestamp: None,
            creation_date: None,
            user_name: None,
        }
    }
}

/// Builds outgoing negotiation messages from the shared read-only catalog
/// and template tables. The only nondeterministic inputs are the clock and
/// the conversation-id source, both injectable.
pub struct MessageGenerator {
    catalog: Arc<Catalog>,
    templates: Arc<TemplateRegistry>,
    conversation_ids: Arc<dyn ConversationIdSource>,
    clock: Arc<dyn Clock>,
}

impl MessageGenerator {
    pub fn new(catalog: Arc<Catalog>, templates: Arc<TemplateRegistry>) -> Self {
        Self::with_sources(catalog, templates, Arc::new(UuidConversationIds), Arc::new(SystemClock))
    }

    pub fn with_sources(
        catalog: Arc<Catalog>,
        templates: Arc<TemplateRegistry>,
        conversation_ids: Arc<dyn ConversationIdSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { catalog, templates, conversation_ids, clock }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Absolute reply deadline: now plus the requested offset, defaulting to
    /// ten minutes.
    pub fn reply_by(&self, minutes_from_now: Option<i64>) -> DateTime<Utc> {
        self.clock.now() + Duration::minutes(minutes_from_now.unwrap_or(DEFAULT_REPLY_MINUTES))
    }

    /// Produces a message of the requested kind, or `None` when no skeleton
    /// is registered for it. Catalog misses are hard errors; value-set
    /// problems are not (an invalid set opens the conversation without
    /// payload elements, and the reason is recoverable through
    /// [`evaluate`](crate::validation::evaluate)).
    pub fn generate(&self, request: GenerateRequest) -> Result<Option<Message>, DomainError> {
        let Some(skeleton) = self.templates.skeleton(request.message_type) else {
            return Ok(None);
        };

        let mut message = skeleton.clone();
        message.frame.sender.identification.id = Some(request.user_id.clone());
        message.frame.reply_by = Some(self.reply_by(request.reply_offset_minutes));
        message.user_name = request.user_name.clone();

        match (&request.original_message, &request.irdi) {
            (Some(prior), _) if request.message_type != MessageType::CallForProposal => {
                self.continue_conversation(&mut message, prior, &request)?;
            }
            (_, Some(irdi)) if request.message_type == MessageType::CallForProposal => {
                self.open_conversation(&mut message, irdi, &request)?;
            }
            _ => {}
        }

        Ok(Some(message))
    }

    fn continue_conversation(
        &self,
        message: &mut Message,
        prior: &Message,
        request: &GenerateRequest,
    ) -> Result<(), DomainError> {
        message.frame.conversation_id = prior.frame.conversation_id.clone();
        message.frame.receiver.identification.id = prior.frame.sender.identification.id.clone();
        message.data_elements = prior.data_elements.clone();
        message.frame.location = prior.frame.location.clone();
        message.frame.start_timestamp = prior.frame.start_timestamp;
        message.frame.end_timestamp = prior.frame.end_timestamp;
        message.frame.creation_date = prior.frame.creation_date;

        if prior.wallet_address.is_some() {
            message.wallet_address = prior.wallet_address.clone();
        }

        if request.message_type == MessageType::Proposal {
            if let (Some(price), Some(irdi)) = (request.price, &request.irdi) {
                self.override_price(message, irdi, price)?;
            }
        }

        // Extension fields carried by earlier messages (sensor data, DID
        // tokens) win over same-named entries already on the clone.
        for (key, value) in &prior.extensions {
            message.extensions.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    /// Replaces any price-tagged element in the copied payload with the
    /// catalog's price slot carrying `price`; the price slot always ends up
    /// last.
    fn override_price(
        &self,
        message: &mut Message,
        irdi: &Irdi,
        price: Decimal,
    ) -> Result<(), DomainError> {
        let Some(mut price_element) = self.catalog.price_element(irdi)? else {
            return Err(DomainError::InvariantViolation(format!(
                "capability `{irdi}` declares no price slot to override"
            )));
        };
        price_element.value = Some(Value::String(price.to_string()));

        let Some(instance) = message.data_elements.submodels.first_mut() else {
            return Err(DomainError::InvariantViolation(
                "price override requires a prior message carrying a submodel payload".to_owned(),
            ));
        };
        instance.identification.submodel_elements.retain(|element| !element.is_price());
        instance.identification.submodel_elements.push(price_element);

        Ok(())
    }

    fn open_conversation(
        &self,
        message: &mut Message,
        irdi: &Irdi,
        request: &GenerateRequest,
    ) -> Result<(), DomainError> {
        message.frame.conversation_id = Some(self.conversation_ids.mint());

        if request.location.is_some() {
            message.frame.location = request.location.clone();
        }
        if request.start_timestamp.is_some() && request.end_timestamp.is_some() {
            message.frame.start_timestamp = request.start_timestamp;
            message.frame.end_timestamp = request.end_timestamp;
        }
        if request.creation_date.is_some() {
            message.frame.creation_date = request.creation_date;
        }

        if evaluate(&self.catalog, irdi, &request.submodel_values)?.is_valid() {
            let elements = self
                .catalog
                .schema_for(irdi)?
                .into_iter()
                .map(|mut element| {
                    element.value = request.submodel_values.get(&element.semantic_id).cloned();
                    element
                })
                .collect();

            message.data_elements.submodels = vec![SubmodelInstance {
                identification: SubmodelIdentification {
                    id: irdi.clone(),
                    submodel_elements: elements,
                },
            }];
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use crate::catalog::{CapabilitySchema, Catalog};
    use crate::domain::element::{Element, Irdi, ValueType};
    use crate::domain::message::{Message, MessageType};
    use crate::errors::DomainError;
    use crate::templates::TemplateRegistry;

    use super::{Clock, ConversationIdSource, GenerateRequest, MessageGenerator};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct StaticIds(&'static str);

    impl ConversationIdSource for StaticIds {
        fn mint(&self) -> String {
            self.0.to_owned()
        }
    }

    fn element(id_short: &str, semantic_id: &str, value_type: ValueType) -> Element {
        Element {
            id_short: id_short.to_owned(),
            semantic_id: semantic_id.to_owned(),
            value_type,
            value: None,
        }
    }

    fn drilling_irdi() -> Irdi {
        Irdi::from("0173-1#01-AKJ975#017")
    }

    fn catalog() -> Catalog {
        let schema = CapabilitySchema {
            submodel_elements: vec![
                element("power", "s1", ValueType::Integer),
                element("preis", "s-price", ValueType::Double),
            ],
        };
        let mut capabilities = BTreeMap::new();
        capabilities.insert(drilling_irdi(), schema);
        Catalog::new(capabilities, Vec::new())
    }

    fn registry() -> TemplateRegistry {
        TemplateRegistry::new(MessageType::ALL.map(|kind| {
            let mut skeleton = Message::default();
            skeleton.frame.message_type = Some(kind);
            (kind, skeleton)
        }))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).single().expect("valid timestamp")
    }

    fn generator() -> MessageGenerator {
        MessageGenerator::with_sources(
            Arc::new(catalog()),
            Arc::new(registry()),
            Arc::new(StaticIds("conv-1")),
            Arc::new(FixedClock(fixed_now())),
        )
    }

    fn call_for_proposal() -> Message {
        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.irdi = Some(drilling_irdi());
        request.submodel_values.insert("s1".to_owned(), json!(42));
        generator()
            .generate(request)
            .expect("catalog hit")
            .expect("skeleton registered")
    }

    #[test]
    fn call_for_proposal_mints_identity_and_binds_values() {
        let message = call_for_proposal();

        assert_eq!(message.frame.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(message.frame.sender.identification.id.as_deref(), Some("u1"));
        assert_eq!(message.frame.reply_by, Some(fixed_now() + Duration::minutes(10)));

        let elements = message.payload_elements().expect("payload bound");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].id_short, "power");
        assert_eq!(elements[0].value, Some(json!(42)));
        assert_eq!(
            message.data_elements.submodels[0].identification.id,
            drilling_irdi()
        );
    }

    #[test]
    fn invalid_value_set_opens_conversation_without_payload() {
        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.irdi = Some(drilling_irdi());
        request.submodel_values.insert("s1".to_owned(), json!("not a number"));

        let message = generator()
            .generate(request)
            .expect("catalog hit")
            .expect("skeleton registered");

        assert_eq!(message.frame.conversation_id.as_deref(), Some("conv-1"));
        assert!(message.data_elements.submodels.is_empty());
    }

    #[test]
    fn call_for_proposal_with_unknown_identifier_is_an_error() {
        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.irdi = Some(Irdi::from("0173-1#01-XXX000#000"));

        let error = generator().generate(request).expect_err("catalog miss");
        assert!(matches!(error, DomainError::CatalogNotFound { .. }));
    }

    #[test]
    fn start_and_end_timestamps_are_only_set_together() {
        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.irdi = Some(drilling_irdi());
        request.submodel_values.insert("s1".to_owned(), json!(42));
        request.start_timestamp = Some(fixed_now());

        let message = generator()
            .generate(request)
            .expect("catalog hit")
            .expect("skeleton registered");

        assert!(message.frame.start_timestamp.is_none());
        assert!(message.frame.end_timestamp.is_none());
    }

    #[test]
    fn continuation_preserves_conversation_and_reverses_direction() {
        let prior = call_for_proposal();

        let mut request = GenerateRequest::new(MessageType::AcceptProposal, "u2");
        request.original_message = Some(prior.clone());

        let message = generator()
            .generate(request)
            .expect("no catalog access needed")
            .expect("skeleton registered");

        assert_eq!(message.frame.conversation_id, prior.frame.conversation_id);
        assert_eq!(message.frame.sender.identification.id.as_deref(), Some("u2"));
        assert_eq!(message.frame.receiver.identification.id.as_deref(), Some("u1"));
        assert_eq!(message.data_elements, prior.data_elements);
    }

    #[test]
    fn proposal_price_override_lands_last_with_supplied_value() {
        let prior = call_for_proposal();

        let mut request = GenerateRequest::new(MessageType::Proposal, "u2");
        request.original_message = Some(prior);
        request.irdi = Some(drilling_irdi());
        request.price = Some(Decimal::new(4250, 2));

        let message = generator()
            .generate(request)
            .expect("catalog hit")
            .expect("skeleton registered");

        let elements = message.payload_elements().expect("payload copied");
        let price_slots: Vec<&Element> =
            elements.iter().filter(|element| element.is_price()).collect();
        assert_eq!(price_slots.len(), 1);
        assert_eq!(elements.last().expect("non-empty").id_short, "preis");
        assert_eq!(
            elements.last().expect("non-empty").value,
            Some(Value::String("42.50".to_owned()))
        );
    }

    #[test]
    fn repeated_price_overrides_never_accumulate_price_slots() {
        let prior = call_for_proposal();

        let mut first = GenerateRequest::new(MessageType::Proposal, "u2");
        first.original_message = Some(prior);
        first.irdi = Some(drilling_irdi());
        first.price = Some(Decimal::new(4250, 2));
        let counter = generator()
            .generate(first)
            .expect("catalog hit")
            .expect("skeleton registered");

        let mut second = GenerateRequest::new(MessageType::Proposal, "u1");
        second.original_message = Some(counter);
        second.irdi = Some(drilling_irdi());
        second.price = Some(Decimal::new(3999, 2));
        let message = generator()
            .generate(second)
            .expect("catalog hit")
            .expect("skeleton registered");

        let elements = message.payload_elements().expect("payload copied");
        assert_eq!(elements.iter().filter(|element| element.is_price()).count(), 1);
        assert_eq!(
            elements.last().expect("non-empty").value,
            Some(Value::String("39.99".to_owned()))
        );
    }

    #[test]
    fn price_override_without_payload_is_an_invariant_violation() {
        let mut prior = Message::default();
        prior.frame.conversation_id = Some("conv-1".to_owned());

        let mut request = GenerateRequest::new(MessageType::Proposal, "u2");
        request.original_message = Some(prior);
        request.irdi = Some(drilling_irdi());
        request.price = Some(Decimal::ONE);

        let error = generator().generate(request).expect_err("no payload to splice into");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn price_without_identifier_leaves_payload_untouched() {
        let prior = call_for_proposal();

        let mut request = GenerateRequest::new(MessageType::Proposal, "u2");
        request.original_message = Some(prior.clone());
        request.price = Some(Decimal::ONE);

        let message = generator()
            .generate(request)
            .expect("no catalog access needed")
            .expect("skeleton registered");
        assert_eq!(message.data_elements, prior.data_elements);
    }

    #[test]
    fn wallet_address_is_carried_forward_when_present() {
        let mut prior = call_for_proposal();
        prior.wallet_address = Some("iota1qxyz".to_owned());

        let mut request = GenerateRequest::new(MessageType::InformPayment, "u2");
        request.original_message = Some(prior);

        let message = generator()
            .generate(request)
            .expect("no catalog access needed")
            .expect("skeleton registered");
        assert_eq!(message.wallet_address.as_deref(), Some("iota1qxyz"));
    }

    #[test]
    fn extension_fields_survive_continuation_and_take_precedence() {
        let mut prior = call_for_proposal();
        prior.extensions.insert("sensorData".to_owned(), json!({ "rpm": 900 }));

        let mut request = GenerateRequest::new(MessageType::InformConfirm, "u2");
        request.original_message = Some(prior);

        let message = generator()
            .generate(request)
            .expect("no catalog access needed")
            .expect("skeleton registered");
        assert_eq!(message.extensions.get("sensorData"), Some(&json!({ "rpm": 900 })));
    }

    #[test]
    fn neither_branch_yields_identity_and_deadline_only() {
        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.user_name = Some("Alice Miller".to_owned());

        let message = generator()
            .generate(request)
            .expect("no catalog access needed")
            .expect("skeleton registered");

        assert!(message.frame.conversation_id.is_none());
        assert!(message.data_elements.submodels.is_empty());
        assert_eq!(message.frame.sender.identification.id.as_deref(), Some("u1"));
        assert_eq!(message.user_name.as_deref(), Some("Alice Miller"));
        assert_eq!(message.frame.reply_by, Some(fixed_now() + Duration::minutes(10)));
    }

    #[test]
    fn missing_skeleton_is_a_soft_failure() {
        let generator = MessageGenerator::with_sources(
            Arc::new(catalog()),
            Arc::new(TemplateRegistry::default()),
            Arc::new(StaticIds("conv-1")),
            Arc::new(FixedClock(fixed_now())),
        );

        let outcome = generator
            .generate(GenerateRequest::new(MessageType::Proposal, "u1"))
            .expect("nothing to look up");
        assert!(outcome.is_none());
    }

    #[test]
    fn reply_offset_is_honored_and_defaulted() {
        let generator = generator();
        assert_eq!(generator.reply_by(None), fixed_now() + Duration::minutes(10));
        assert_eq!(generator.reply_by(Some(30)), fixed_now() + Duration::minutes(30));
    }

    #[test]
    fn generation_never_mutates_the_shared_skeleton() {
        let templates = Arc::new(registry());
        let generator = MessageGenerator::with_sources(
            Arc::new(catalog()),
            Arc::clone(&templates),
            Arc::new(StaticIds("conv-1")),
            Arc::new(FixedClock(fixed_now())),
        );

        let mut request = GenerateRequest::new(MessageType::CallForProposal, "u1");
        request.irdi = Some(drilling_irdi());
        request.submodel_values.insert("s1".to_owned(), json!(42));
        generator.generate(request).expect("catalog hit").expect("skeleton registered");

        let skeleton = templates.skeleton(MessageType::CallForProposal).expect("registered");
        assert!(skeleton.frame.sender.identification.id.is_none());
        assert!(skeleton.data_elements.submodels.is_empty());
    }
}
