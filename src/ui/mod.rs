// UI and formatting module

pub mod formatters;
pub mod messages;
pub mod status_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_duration, format_timestamp};
pub use messages::{dimmed, info, success};
pub use status_formatters::{
    format_docker_projects, format_health_report, format_smart_section, format_verdict,
};
