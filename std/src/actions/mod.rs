pub mod flow;
pub mod logic;
