pub mod refresh_token;
pub mod session;
pub mod user;

pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use session::{AuthContext, AuthInfo, UserWithAuth};
pub use user::{LoginRequest, NewUser, RefreshRequest, RegisterRequest, User};
