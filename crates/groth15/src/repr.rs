//! JSON representations of keys and signatures, group elements and scalars
//! hex encoded.

use crate::{Groth15Instance, Groth15KeyPair, Groth15Signature, Placement};
use bilinear::{BilinearGroup, Group};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sps_bench::{OperationError, SignatureKeyPair};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairRepr {
    pub signing_key: String,
    pub verification_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRepr {
    pub r: String,
    pub s: String,
    pub t: Vec<String>,
}

impl KeyPairRepr {
    pub fn from_key_pair<G, L>(
        instance: &Groth15Instance<G, L>,
        key_pair: &Groth15KeyPair<G, L>,
    ) -> Result<Self, OperationError>
    where
        G: BilinearGroup,
        L: Placement<G>,
    {
        let group = instance.group();
        Ok(Self {
            signing_key: hex::encode(
                group.encode_scalar(key_pair.signing_key())?,
            ),
            verification_key: hex::encode(
                L::key_group(group).encode(key_pair.verification_key())?,
            ),
        })
    }

    pub fn restore<G, L>(
        &self,
        instance: &Groth15Instance<G, L>,
    ) -> Result<Groth15KeyPair<G, L>, OperationError>
    where
        G: BilinearGroup,
        L: Placement<G>,
    {
        let group = instance.group();
        let signing_key =
            group.decode_scalar(&unhex("signing_key", &self.signing_key)?)?;
        let verification_key = L::key_group(group)
            .decode(&unhex("verification_key", &self.verification_key)?)?;
        Ok(Groth15KeyPair::new(signing_key, verification_key))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, OperationError> {
        to_json(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OperationError> {
        from_json(bytes)
    }
}

impl SignatureRepr {
    pub fn from_signature<G, L>(
        instance: &Groth15Instance<G, L>,
        signature: &Groth15Signature<G, L>,
    ) -> Result<Self, OperationError>
    where
        G: BilinearGroup,
        L: Placement<G>,
    {
        let group = instance.group();
        let messages = L::message_group(group);
        let t = signature
            .t
            .iter()
            .map(|t_i| messages.encode(t_i).map(hex::encode))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            r: hex::encode(L::key_group(group).encode(&signature.r)?),
            s: hex::encode(messages.encode(&signature.s)?),
            t,
        })
    }

    pub fn restore<G, L>(
        &self,
        instance: &Groth15Instance<G, L>,
    ) -> Result<Groth15Signature<G, L>, OperationError>
    where
        G: BilinearGroup,
        L: Placement<G>,
    {
        let group = instance.group();
        let messages = L::message_group(group);
        let t = self
            .t
            .iter()
            .map(|t_i| -> Result<_, OperationError> {
                Ok(messages.decode(&unhex("t", t_i)?)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Groth15Signature {
            r: L::key_group(group).decode(&unhex("r", &self.r)?)?,
            s: messages.decode(&unhex("s", &self.s)?)?,
            t,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, OperationError> {
        to_json(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OperationError> {
        from_json(bytes)
    }
}

fn unhex(field: &str, value: &str) -> Result<Vec<u8>, OperationError> {
    hex::decode(value).map_err(|err| {
        OperationError::Representation(format!("{field}: {err}"))
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, OperationError> {
    serde_json::to_vec(value)
        .map_err(|err| OperationError::Representation(err.to_string()))
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, OperationError> {
    serde_json::from_slice(bytes)
        .map_err(|err| OperationError::Representation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{KeyPairRepr, SignatureRepr};
    use crate::{Groth15G2, MessagesInG2};
    use bilinear::DebugBilinearGroup;
    use rand::SeedableRng;
    use sps_bench::{
        prepare_messages, BenchRng, G2Messages, MeasuredOperation,
        OperationError, OperationInstance, SignatureKeyPair,
    };

    #[test]
    fn signature_json_lists_one_component_per_element() {
        let group = DebugBilinearGroup::new();
        let mut rng = BenchRng::seed_from_u64(21);
        let instance = Groth15G2::new()
            .construct(&group, 3, &mut rng)
            .expect("setup");
        let key_pair = instance.generate_key_pair(3, &mut rng).expect("keygen");
        let message =
            prepare_messages::<_, G2Messages<_>>(&group, 1, 3, &mut rng)
                .remove(0);
        let signature = instance
            .sign(key_pair.signing_key(), &message, &mut rng)
            .expect("sign");

        let repr =
            SignatureRepr::from_signature(&instance, &signature).expect("repr");
        assert_eq!(repr.t.len(), 3);
        // debug elements encode to 8 bytes
        assert_eq!(repr.s.len(), 16);

        let bytes = repr.to_bytes().expect("json");
        let json: serde_json::Value =
            serde_json::from_slice(&bytes).expect("valid json");
        assert!(json.get("r").is_some_and(serde_json::Value::is_string));
        assert_eq!(SignatureRepr::from_bytes(&bytes).expect("parse"), repr);
    }

    #[test]
    fn bad_hex_is_a_representation_error() {
        let group = DebugBilinearGroup::new();
        let mut rng = BenchRng::seed_from_u64(22);
        let instance = <Groth15G2 as MeasuredOperation<_>>::construct(
            &Groth15G2::new(),
            &group,
            1,
            &mut rng,
        )
        .expect("setup");
        let repr = KeyPairRepr {
            signing_key: "zz".to_owned(),
            verification_key: String::new(),
        };
        let err = repr.restore::<_, MessagesInG2>(&instance).unwrap_err();
        assert!(matches!(err, OperationError::Representation(ref msg) if msg.starts_with("signing_key")));
    }
}
