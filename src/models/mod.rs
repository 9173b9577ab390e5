mod alert_config;
mod client;
mod client_product;
mod product;
mod user;
mod vigencia;

pub use alert_config::*;
pub use client::*;
pub use client_product::*;
pub use product::*;
pub use user::*;
pub use vigencia::*;
