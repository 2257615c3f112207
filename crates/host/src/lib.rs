// lightdeck-host library
// Development host for the lightdeck browser UI

// Configuration
pub mod config;

// In-memory device registry
pub mod registry;

// REST API and static files
pub mod api;

// Event channel (WebSocket)
pub mod channel;
