//! Interpretation of diagnostic transcripts.
//!
//! These parsers read the text a [`CommandRunner`](crate::driver::CommandRunner)
//! returns. The session engine never calls them.

mod attenuation;
mod clean;
mod unconfigured;

pub use attenuation::{Attenuation, Direction, LinkStatus, parse_attenuation};
pub use clean::{clean_output, strip_ansi};
pub use unconfigured::{
    UnconfiguredList, UnconfiguredOnu, UnconfiguredStatus, model_description, parse_unconfigured,
};
