//! Authentication module
//!
//! JWT bearer tokens with argon2 password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenKind};
pub use middleware::{bearer_token, AuthUser};
pub use password::PasswordService;
