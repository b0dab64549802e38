pub mod logic;
pub mod room;
pub mod visuals;
