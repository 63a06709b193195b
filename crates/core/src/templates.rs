use std::collections::BTreeMap;

use crate::domain::message::{Message, MessageType};

/// Immutable message skeletons, one per kind. Generation always works on a
/// clone; the registry itself is never mutated after construction.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    skeletons: BTreeMap<MessageType, Message>,
}

impl TemplateRegistry {
    pub fn new(skeletons: impl IntoIterator<Item = (MessageType, Message)>) -> Self {
        Self { skeletons: skeletons.into_iter().collect() }
    }

    pub fn skeleton(&self, kind: MessageType) -> Option<&Message> {
        self.skeletons.get(&kind)
    }

    /// True when a skeleton is registered for every one of the six kinds.
    pub fn is_complete(&self) -> bool {
        MessageType::ALL.iter().all(|kind| self.skeletons.contains_key(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = MessageType> + '_ {
        self.skeletons.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::message::{Message, MessageType};

    use super::TemplateRegistry;

    fn skeleton(kind: MessageType) -> Message {
        let mut message = Message::default();
        message.frame.message_type = Some(kind);
        message
    }

    #[test]
    fn reports_completeness_over_all_six_kinds() {
        let partial = TemplateRegistry::new([(
            MessageType::Proposal,
            skeleton(MessageType::Proposal),
        )]);
        assert!(!partial.is_complete());

        let full =
            TemplateRegistry::new(MessageType::ALL.map(|kind| (kind, skeleton(kind))));
        assert!(full.is_complete());
    }

    #[test]
    fn lookup_misses_yield_none() {
        let registry = TemplateRegistry::default();
        assert!(registry.skeleton(MessageType::InformPayment).is_none());
    }
}
