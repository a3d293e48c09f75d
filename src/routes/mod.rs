pub mod flashcards;
pub mod health;
pub mod history;
pub mod quiz;
