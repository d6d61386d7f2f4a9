pub mod financing;
pub mod payroll;
pub mod ranking;
pub mod simulation;
