pub mod image;
pub mod instance;
pub mod server;
pub mod state;
pub mod user;

pub use image::{Image, NewImage};
pub use instance::{Instance, InstanceAction, InstanceStatus, LaunchRequest, LaunchResponse, StatusGroup};
pub use server::{NewServer, Server};
pub use state::{AppState, DashboardSession};
pub use user::{ProfileUpdate, SessionUser, SignupRequest};
