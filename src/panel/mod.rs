pub mod actions;
pub mod bridge;
pub mod config;
pub mod consistency;
pub mod notifications;
pub mod redacted;
pub mod result_error;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod timing;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
