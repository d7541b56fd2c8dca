pub mod loan;
pub mod strategy;
