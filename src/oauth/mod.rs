//! GitHub OAuth module
//!
//! Lets a repository collaborator sign in to the CMS admin panel:
//! - Redirect to GitHub's authorize page
//! - Code-for-token exchange
//! - Collaborator and permission check on the configured repository
//! - JSON or popup-page response, per `responseMode`

mod error;
mod github;
mod handler;
mod router;
mod templates;
mod types;

pub use handler::OAuthHandler;
pub use router::create_oauth_router;
