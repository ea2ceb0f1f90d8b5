pub mod auth;
pub mod helpers;
pub mod images;
pub mod instances;
pub mod middleware;
pub mod profile;
pub mod servers;
pub mod system;
