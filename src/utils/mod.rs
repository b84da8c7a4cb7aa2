pub mod drawing;
pub mod font;
pub mod geometry;
