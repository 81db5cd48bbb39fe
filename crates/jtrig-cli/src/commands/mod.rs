pub mod card;
pub mod fill;
pub mod generate;
pub mod project;
pub mod rebin;
pub mod turn_on;
