//! BusyScheduleProvider trait and implementations

pub mod error;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    BoxFuture, BusyMap, BusyScheduleProvider, ErrorProvider, FetchRange, StaticBusyProvider,
};
