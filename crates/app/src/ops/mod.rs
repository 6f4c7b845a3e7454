pub mod access;
pub mod doc;
pub mod init;
pub mod profile;
pub mod version;

pub use access::Access;
pub use doc::Doc;
pub use init::Init;
pub use profile::Profile;
pub use version::Version;
