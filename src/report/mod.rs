pub mod formatter;

pub use formatter::FunnelFormatter;
