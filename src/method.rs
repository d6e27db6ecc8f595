//! The method contract every encode/decode algorithm implements, and the
//! side-channel parameter map (`SideParams`) that carries per-method state
//! from encode to decode.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bits::BitBuffer;
use crate::error::{Result, StegoError};
use crate::signal::Signal;

/// One scalar value a `SideParams` entry can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}
impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}
impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}
impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}
impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}
impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

/// A recognized option name → scalar value map, transmitted as JSON
/// out-of-band between encode and decode (§3 "SideParams").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideParams(HashMap<String, ParamValue>);

impl SideParams {
    pub fn new() -> Self {
        SideParams(HashMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_i64(key).map(|v| v.max(0) as usize)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            ParamValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The payload bit length, `l`, which every method's `SideParams`
    /// carries (§3).
    pub fn len_bits(&self) -> usize {
        self.get_usize("l").unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl TryFrom<&SideParams> for Value {
    type Error = StegoError;

    fn try_from(p: &SideParams) -> Result<Value> {
        Ok(serde_json::to_value(p)?)
    }
}

/// One CLI flag a method's `encode`/`decode` accepts, used only to build
/// the `stego` binary's per-subcommand argument list.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub required: bool,
    pub default: Option<ParamValue>,
}

/// The steganography methods this crate implements (§3 "MethodTag").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodTag {
    Lsb,
    EchoSingle,
    EchoBipolar,
    EchoBf,
    EchoBipolarBf,
    Phase,
    Dsss,
    SilenceInterval,
    ToneInsertion,
}

impl MethodTag {
    pub const ALL: [MethodTag; 9] = [
        MethodTag::Lsb,
        MethodTag::EchoSingle,
        MethodTag::EchoBipolar,
        MethodTag::EchoBf,
        MethodTag::EchoBipolarBf,
        MethodTag::Phase,
        MethodTag::Dsss,
        MethodTag::SilenceInterval,
        MethodTag::ToneInsertion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MethodTag::Lsb => "lsb",
            MethodTag::EchoSingle => "echo_single",
            MethodTag::EchoBipolar => "echo_bipolar",
            MethodTag::EchoBf => "echo_bf",
            MethodTag::EchoBipolarBf => "echo_bipolar_bf",
            MethodTag::Phase => "phase",
            MethodTag::Dsss => "dsss",
            MethodTag::SilenceInterval => "silence_interval",
            MethodTag::ToneInsertion => "tone_insertion",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MethodTag {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self> {
        MethodTag::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| StegoError::InvalidMethod(s.to_string()))
    }
}

/// The common contract every encode/decode algorithm implements (§4.2).
pub trait Method {
    fn tag(&self) -> MethodTag;

    /// Hides `payload` in `cover`. Must fail with `SecretTooLarge` before
    /// allocating a stego buffer if the payload cannot fit, and with
    /// `InvalidParameter` for any out-of-range option.
    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)>;

    /// Recovers the payload from `stego` using the side-params an encode
    /// call produced. Total for any non-negative `l`; `l == 0` yields an
    /// empty `BitBuffer`.
    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer>;

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        Vec::new()
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tag_roundtrips_through_str() {
        for tag in MethodTag::ALL {
            assert_eq!(tag.as_str().parse::<MethodTag>().unwrap(), tag);
        }
    }

    #[test]
    fn unknown_method_tag_errors() {
        assert!("not_a_method".parse::<MethodTag>().is_err());
    }

    #[test]
    fn side_params_json_roundtrip() {
        let mut p = SideParams::new();
        p.insert("l", 16usize).insert("d0", 150i64).insert("password", "hunter2");
        let json = p.to_json().unwrap();
        let back = SideParams::from_json(&json).unwrap();
        assert_eq!(p, back);
        assert_eq!(back.len_bits(), 16);
        assert_eq!(back.get_i64("d0"), Some(150));
        assert_eq!(back.get_str("password"), Some("hunter2"));
    }
}
