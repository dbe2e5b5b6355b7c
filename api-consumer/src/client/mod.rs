//! Request dispatch.
//!
//! This module provides the [`Dispatcher`], which turns an
//! [`Endpoint`](crate::Endpoint) into one network call (two when an auth
//! token must be fetched first) and a normalized result, and the
//! [`Transport`] seam it sends through.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use api_consumer::{Dispatcher, Endpoint, RestMethod, StaticCredentials};
//!
//! let credentials = StaticCredentials::from_yaml_str(
//!     "shop:\n  base_uri: https://api.example.com\n",
//! )?;
//! let dispatcher = Dispatcher::new(credentials)?;
//!
//! let endpoint = Endpoint::builder()
//!     .api_name("shop")
//!     .method(RestMethod::Get)
//!     .path("/users/{id}")
//!     .build()?
//!     .add_url_param("id", "42");
//!
//! let result = dispatcher.send(&endpoint).await;
//! if let Some(user) = result.payload() {
//!     println!("{:?}", user.get("name"));
//! }
//! ```

mod dispatcher;
mod transport;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use transport::{PreparedRequest, ReqwestTransport, Transport};
