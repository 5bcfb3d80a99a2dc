#![deny(warnings)]
pub mod error;
pub mod game;
pub mod model;

pub use error::PenneyError;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "penney"
    }

    pub const fn codename() -> &'static str {
        "Cards and Tricks"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "penney");
        assert_eq!(AppInfo::codename(), "Cards and Tricks");
        assert!(!AppInfo::version().is_empty());
    }
}
