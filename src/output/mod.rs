pub mod terminal;

pub use terminal::print_report;
