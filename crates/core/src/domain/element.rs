use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Industry classification identifier keying a capability in the catalog,
/// e.g. `0173-1#01-AKJ975#017`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Irdi(pub String);

impl fmt::Display for Irdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Irdi {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Values proposed by a negotiating party, keyed by the target element's
/// semantic id.
pub type ValueSet = BTreeMap<String, Value>;

/// Declared value type of a capability element. The catalog uses XSD-style
/// tags; anything outside the known set deserializes to
/// [`ValueType::Unspecified`], which is deliberately permissive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    String,
    LangString,
    #[serde(rename = "anyURI")]
    AnyUri,
    Decimal,
    Double,
    Float,
    Int,
    Integer,
    Long,
    Short,
    Byte,
    UnsignedLong,
    UnsignedShort,
    UnsignedByte,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    Time,
    Date,
    DateTime,
    DateTimeStamp,
    Boolean,
    ComplexType,
    AnyType,
    AnySimpleType,
    AnyAtomicType,
    #[serde(other)]
    Unspecified,
}

/// One named, typed slot of a capability schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id_short: String,
    pub semantic_id: String,
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Short names marking the schema's price slot. Price never travels through
/// the validation path; it is spliced in by the generator's override flow.
pub const PRICE_ID_SHORTS: [&str; 2] = ["preis", "price"];

impl Element {
    pub fn is_price(&self) -> bool {
        PRICE_ID_SHORTS.contains(&self.id_short.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Irdi, ValueType};

    #[test]
    fn value_type_tags_round_trip_wire_names() {
        let tag: ValueType = serde_json::from_str("\"nonNegativeInteger\"").expect("known tag");
        assert_eq!(tag, ValueType::NonNegativeInteger);

        let uri: ValueType = serde_json::from_str("\"anyURI\"").expect("anyURI tag");
        assert_eq!(uri, ValueType::AnyUri);
    }

    #[test]
    fn unknown_value_type_tag_falls_back_to_unspecified() {
        let tag: ValueType = serde_json::from_str("\"futureType\"").expect("catch-all");
        assert_eq!(tag, ValueType::Unspecified);
    }

    #[test]
    fn price_slot_is_recognized_by_short_name() {
        let price = Element {
            id_short: "preis".to_owned(),
            semantic_id: "0173-1#02-AAO742#002".to_owned(),
            value_type: ValueType::Double,
            value: None,
        };
        assert!(price.is_price());

        let power = Element { id_short: "power".to_owned(), ..price };
        assert!(!power.is_price());
    }

    #[test]
    fn irdi_displays_as_raw_identifier() {
        assert_eq!(Irdi::from("0173-1#01-AKJ975#017").to_string(), "0173-1#01-AKJ975#017");
    }
}
