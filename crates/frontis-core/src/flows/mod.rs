//! Concrete dialog flows built on the dialog machinery.

pub mod homework;

pub use homework::HomeworkFlows;
