//! Common entry points, re-exported for a single `use audiosteg::prelude::*`
//! (`fundsp::prelude`'s convention).

pub use crate::bits::BitBuffer;
pub use crate::dtype::Dtype;
pub use crate::error::{Result, StegoError};
pub use crate::facade::{MethodFacade, StatBundle};
pub use crate::method::{Method, MethodTag, SideParams};
pub use crate::signal::Signal;
pub use crate::wav::{read_wav, write_wav};
