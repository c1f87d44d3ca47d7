pub mod admin_use_case;
pub mod context;
pub mod ports;
pub mod sweep_use_case;
