//! LinkedIn provider integration.

mod adapter;

pub use adapter::{
    default_app, LinkedInAdapter, LINKEDIN_AUTHORIZE_URL, LINKEDIN_PROFILE_URL,
    LINKEDIN_TOKEN_URL,
};
