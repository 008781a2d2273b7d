//! GoDaddy adapter: domains, DNS and hosting.
//!
//! Authenticates with `Authorization: sso-key <key>:<secret>`. The OTE
//! sandbox is used unless the configuration selects production.

mod client;
mod types;

pub use client::GoDaddyClient;
pub use types::{
    DnsRecord, DomainAvailability, DomainPurchaseRequest, DomainPurchaseResponse, GoDaddyDomain,
    HostingAccount, HostingProvisionRequest,
};
