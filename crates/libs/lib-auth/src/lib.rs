//! # Authentication Library
//!
//! Password credentials, bearer tokens, and the sign-in / authenticate flow
//! that ties them to a user directory.

pub mod clock;
pub mod error;
pub mod pwd;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use error::{AuthError, DirectoryError, Result};
pub use pwd::{Credential, CredentialHasher};
pub use session::{Authenticator, IdentityRecord, SignedIn, UserDirectory};
pub use token::{Claims, IdentityClaim, IssuedToken, TokenService};
