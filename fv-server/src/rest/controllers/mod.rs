pub mod activity;
pub mod admin;
pub mod ideas;
pub mod nexus;
pub mod share;
pub mod system;
pub mod teams;
pub mod users;
pub mod validation;
pub mod waitlist;

pub use activity::ActivityController;
pub use admin::AdminController;
pub use ideas::IdeasController;
pub use nexus::NexusController;
pub use share::ShareController;
pub use system::SystemController;
pub use teams::TeamsController;
pub use users::UsersController;
pub use validation::ValidationController;
pub use waitlist::WaitlistController;
