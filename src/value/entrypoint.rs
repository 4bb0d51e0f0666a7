//! Contract entrypoints, as targets of `contract` values
//!
//! An entrypoint is written on the wire as `"<address>%<name>"`. It has no
//! [`Typed`](crate::conv::Typed) impl, as the parameter type of an
//! entrypoint depends on the contract it belongs to.

use crate::conv::{Decode, DecodeError, DecodeResult, Encode};
use crate::micheline::Micheline;

use super::opaque::Address;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entrypoint {
    addr: Address,
    name: String,
}

impl Entrypoint {
    pub fn new(addr: Address, name: impl Into<String>) -> Self {
        Self {
            addr,
            name: name.into(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.addr
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%{}", self.addr, self.name)
    }
}

impl Encode for Entrypoint {
    fn encode(&self) -> Micheline {
        Micheline::string(self.to_string())
    }
}

/// Splits at the last `%`, so that the name never contains one
impl Decode for Entrypoint {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        let text = node.as_string()?;
        match text.rsplit_once('%') {
            Some((addr, name)) => Ok(Entrypoint::new(Address::new(addr), name)),
            None => Err(DecodeError::unexpected("address%entrypoint string", node)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wire_form() {
        let ep = Entrypoint::new(Address::new("KT1BEqzn5Wx8uJrZNvuS9DVHmLvG9td3fDLi"), "transfer");
        assert_eq!(
            ep.encode_json().to_string(),
            r#"{"string":"KT1BEqzn5Wx8uJrZNvuS9DVHmLvG9td3fDLi%transfer"}"#
        );
        assert_eq!(Entrypoint::decode(&ep.encode()), Ok(ep));
    }

    #[test]
    fn splits_at_last_separator() {
        let ep = Entrypoint::decode(&Micheline::string("a%b%c")).unwrap();
        assert_eq!(ep.address().as_str(), "a%b");
        assert_eq!(ep.name(), "c");
        assert!(Entrypoint::decode(&Micheline::string("KT1")).is_err());
    }
}
