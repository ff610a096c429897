//! Blog thumbnail generation service.
//!
//! A title is turned into an image prompt, a remote text-to-image API renders
//! the base illustration, and the title is composited on top with a drop
//! shadow and a translucent backdrop.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod routes;
pub mod service;
pub mod utils;

use config::ServiceConfig;
use service::workflow::ThumbnailWorkflow;

pub struct ServiceState {
    pub config: ServiceConfig,
    pub workflow: ThumbnailWorkflow,
}
