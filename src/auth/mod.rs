pub mod authorization;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

// Re-export necessary items
pub use authorization::{authorize_owner, authorize_owner_str};
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, InvalidToken, TokenService};
