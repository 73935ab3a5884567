//! emssign — vendor-prefixed HMAC request signing and verification in the
//! style of the AWS Signature Version 4 family.
//!
//! A [`client::Client`] signs outgoing requests, producing either an
//! `Authorization` header value or a presigned URL's query parameters.
//! A [`server::Server`] verifies incoming requests against a
//! [`party::Party`] scope and a caller-supplied [`verify::SecretResolver`],
//! returning a [`verify::Verdict`].
//!
//! The library never touches a socket: callers adapt whatever HTTP stack
//! fronts them to [`request::RequestView`].

pub mod canonical;
pub mod client;
pub mod config;
pub mod errors;
pub mod hash;
pub mod keys;
pub mod parse;
pub mod party;
pub mod present;
pub mod request;
pub mod server;
pub mod signer;
pub mod time;
pub mod verify;

pub use client::Client;
pub use errors::AuthError;
pub use party::Party;
pub use request::{HeaderBlock, RequestView, SignedHeaders};
pub use server::Server;
pub use verify::{SecretResolver, Verdict};
