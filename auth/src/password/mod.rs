pub mod argon2;
pub mod encoded;
pub mod errors;

pub use self::argon2::PasswordHasher;
pub use encoded::StoredHash;
pub use errors::PasswordError;
