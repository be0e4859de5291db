pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod local;
pub mod logger;
pub mod remote;
pub mod resolver;
pub mod store;

mod io_utils;

pub use client::{BuildNumber, ClientId, ClientInfo, IntoClientId};
pub use codec::{
    HashParts, KeyValue, KeyValues, ResourceIndex, ResourceIndexEntry, ResourceView,
    decompose_hash, parse_index, parse_key_value_text,
};
pub use error::{ResError, Result};
pub use local::LocalResolver;
pub use remote::{HttpTransport, RemoteEndpoints, RemoteHashFetcher, RemoteIndexCache};
pub use resolver::Resolver;
pub use store::{HashStore, StoreSource};

pub use tracing;
