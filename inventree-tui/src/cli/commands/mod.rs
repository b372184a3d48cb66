pub mod app;
pub mod create_env;
pub mod generate_config;
