pub mod claims;
pub mod errors;
pub mod signer;

pub use claims::AccessTokenClaims;
pub use errors::TokenError;
pub use signer::IssuedToken;
pub use signer::TokenSigner;
pub use signer::TokenSignerSettings;
