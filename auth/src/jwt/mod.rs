pub mod claims;
pub mod encoding;
pub mod errors;
pub mod handler;
pub mod ttl;

pub use claims::Claims;
pub use claims::ExtraClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use ttl::Ttl;
