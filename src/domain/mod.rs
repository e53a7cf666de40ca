//! Domain layer: payroll records, value objects, lifecycle types and the
//! ports the application layer drives.

pub mod company;
pub mod employee;
pub mod event;
pub mod payment;
pub mod ports;
pub mod value;
