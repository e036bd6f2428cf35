use serde::{Serialize, Deserialize, Deserializer, Serializer, de::{self, Visitor}, ser::SerializeStruct};
use crate::{
    Modulus, EncryptionParameters, SchemeType
};

impl Serialize for Modulus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        serializer.serialize_u64(self.value())
    }
}

impl<'de> Deserialize<'de> for Modulus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        let value = u64::deserialize(deserializer)?;
        Modulus::new(value).map_err(de::Error::custom)
    }
}

const PARMS_FIELDS: &[&str] = &["scheme", "poly_modulus_degree", "coeff_modulus", "plain_modulus"];

impl Serialize for EncryptionParameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        let mut s = serializer.serialize_struct("EncryptionParameters", PARMS_FIELDS.len())?;
        s.serialize_field("scheme", &self.scheme())?;
        s.serialize_field("poly_modulus_degree", &self.poly_modulus_degree())?;
        s.serialize_field("coeff_modulus", self.coeff_modulus())?;
        s.serialize_field("plain_modulus", self.plain_modulus())?;
        s.end()
    }
}

/// Rebuilds the parameters through the setters, so the [crate::ParmsID] is
/// always recomputed and setter checks apply.
fn rebuild_parms<E: de::Error>(
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: &[Modulus],
    plain_modulus: &Modulus,
) -> Result<EncryptionParameters, E> {
    let mut parms = EncryptionParameters::new(scheme);
    parms.set_poly_modulus_degree(poly_modulus_degree).map_err(E::custom)?;
    if !coeff_modulus.is_empty() {
        parms.set_coeff_modulus(coeff_modulus).map_err(E::custom)?;
    }
    parms.set_plain_modulus(plain_modulus);
    Ok(parms)
}

impl<'de> Deserialize<'de> for EncryptionParameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        struct EncryptionParametersVisitor;
        impl<'de> Visitor<'de> for EncryptionParametersVisitor {
            type Value = EncryptionParameters;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("struct EncryptionParameters")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where A: de::SeqAccess<'de>,
            {
                let scheme = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let poly_modulus_degree = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let coeff_modulus = seq.next_element::<Vec<Modulus>>()?.ok_or_else(|| de::Error::invalid_length(2, &self))?;
                let plain_modulus = seq.next_element::<Modulus>()?.ok_or_else(|| de::Error::invalid_length(3, &self))?;
                rebuild_parms(scheme, poly_modulus_degree, &coeff_modulus, &plain_modulus)
            }

        }
        deserializer.deserialize_struct("EncryptionParameters", PARMS_FIELDS, EncryptionParametersVisitor)
    }
}
