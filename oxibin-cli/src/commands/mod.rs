//! Command implementations for OxiBin CLI.

pub mod extract;
pub mod inflate;
pub mod info;
pub mod list;
pub mod proto;
pub mod test;

pub use extract::{ExtractOptions, cmd_extract};
pub use inflate::cmd_inflate;
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
pub use proto::{ProtoOptions, cmd_proto};
pub use test::cmd_test;
