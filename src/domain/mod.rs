pub mod coord;
pub mod entity;
pub mod grid;
pub mod rules;
