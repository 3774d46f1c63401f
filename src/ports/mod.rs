//! Ports - interfaces between the intake core and its collaborators.
//!
//! Each port is a narrow async trait with its own error enum. The
//! workflow depends only on these traits; adapters provide in-process
//! implementations and a scaled deployment can substitute external
//! ones without touching the workflow.

mod catalog_source;
mod messaging_gateway;
mod patient_directory;
mod quote_store;
mod state_store;

pub use catalog_source::{
    load_alias_table, AliasSource, CatalogError, CatalogProvider, CatalogSource,
};
pub use messaging_gateway::{GatewayError, MessagingGateway};
pub use patient_directory::{DirectoryError, PatientDirectory};
pub use quote_store::{QuoteLineItem, QuoteStore, QuoteStoreError};
pub use state_store::{StateStore, StateStoreError};
