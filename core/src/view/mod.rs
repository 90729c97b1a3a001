//! Per-screen state holders. Each one calls the gateway, keeps the loaded
//! entities, reloads after a successful write and queues user notices.

pub mod attempts;
pub mod documentation;
pub mod feedback;
pub mod locations;
pub mod notice;
pub mod routes;

pub use attempts::AttemptsView;
pub use documentation::RouteDocumentation;
pub use feedback::FeedbackView;
pub use locations::LocationsView;
pub use notice::{Notice, NoticeLevel, Notices};
pub use routes::RoutesView;
