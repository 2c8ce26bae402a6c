pub mod appointment;
pub mod branch;
pub mod customer;
pub mod employee;
pub mod role;
pub mod schedule;
pub mod user;
