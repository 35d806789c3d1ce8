pub mod provider_link;
pub mod user;

pub use provider_link::PostgresProviderLinkRepository;
pub use user::PostgresUserRepository;
