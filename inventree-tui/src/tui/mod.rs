pub mod app;
pub mod apps;
pub mod command;
pub mod modals;
pub mod renderer;
pub mod resource;
pub mod runtime;
pub mod state;
pub mod subscription;
pub mod widgets;

pub use app::App;
pub use command::Command;
pub use resource::Resource;
pub use state::{ModalState, Theme};
pub use subscription::{KeyBinding, Subscription};
