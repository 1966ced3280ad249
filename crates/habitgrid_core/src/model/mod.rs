//! Domain model for habits and their daily completion facts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the types they protect.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId` that is never reused
//!   for another live habit.
//! - A completion is identified by `(date, habit_id)`; its presence is the
//!   only representation of "done on that day".

pub mod completion;
pub mod habit;
