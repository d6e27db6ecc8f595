//! The nine encode/decode algorithms (§4.4), plus the shared echo-hiding
//! infrastructure they build on.

mod echo_bf;
mod echo_bipolar;
mod echo_bipolar_bf;
mod echo_common;
mod echo_single;
mod dsss;
mod lsb;
mod phase;
mod silence_interval;
mod tone_insertion;

pub use echo_bf::EchoBf;
pub use echo_bipolar::EchoBipolar;
pub use echo_bipolar_bf::EchoBipolarBf;
pub use echo_single::EchoSingle;
pub use dsss::Dsss;
pub use lsb::Lsb;
pub use phase::Phase;
pub use silence_interval::SilenceInterval;
pub use tone_insertion::ToneInsertion;

use crate::method::{Method, MethodTag};

/// Looks up the `Method` implementation for a tag (§3 "MethodTag").
pub fn by_tag(tag: MethodTag) -> Box<dyn Method> {
    match tag {
        MethodTag::Lsb => Box::new(Lsb),
        MethodTag::EchoSingle => Box::new(EchoSingle),
        MethodTag::EchoBipolar => Box::new(EchoBipolar),
        MethodTag::EchoBf => Box::new(EchoBf),
        MethodTag::EchoBipolarBf => Box::new(EchoBipolarBf),
        MethodTag::Phase => Box::new(Phase),
        MethodTag::Dsss => Box::new(Dsss),
        MethodTag::SilenceInterval => Box::new(SilenceInterval),
        MethodTag::ToneInsertion => Box::new(ToneInsertion),
    }
}
