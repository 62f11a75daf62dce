pub mod session_info;
pub mod totals;
