pub mod aggregate_function;
pub use aggregate_function::*;

pub mod aggregator;
pub use aggregator::*;

pub mod aggregate_impl;
pub use aggregate_impl::*;

pub mod aggregate_registry;
pub use aggregate_registry::*;

pub mod functions;
pub use functions::*;

pub mod server_aggregators;
pub use server_aggregators::*;

pub mod client_aggregators;
pub use client_aggregators::*;
