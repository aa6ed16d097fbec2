// Frameshell services
// Services provide the ambient machinery: the typed event bus, the rendering
// collaborator contract, and settings persistence.

pub mod event_bus;
pub mod renderer;
pub mod settings_engine;
