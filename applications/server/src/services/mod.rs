/// Server services
pub mod session;

pub use session::SessionService;
