//! `jobboard-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod capabilities;
pub mod claims;
pub mod identity;
pub mod policy;
pub mod roles;
pub mod session;

pub use authorize::{
    authorize_navigation, decide, explain_navigation, Navigation, NavigationExplanation,
    RedirectReason,
};
pub use capabilities::{Capabilities, Capability};
pub use claims::{check_token, decode_unverified, validate_claims, TokenClaims, TokenError};
pub use identity::Identity;
pub use policy::{
    Access, PolicyError, RouteMatch, RoutePattern, RoutePolicy, RouteTable, RouteTableBuilder,
    ADMINS, ANY_AUTHENTICATED, JOB_SEEKERS, RECRUITERS, RECRUITER_ONLY,
};
pub use roles::{Role, RoleSet, UnknownRole};
pub use session::{Session, SessionError, SessionToken};
