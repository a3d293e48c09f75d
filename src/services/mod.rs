pub mod connectivity;
pub mod flashcard_parser;
pub mod generation_service;
pub mod grading_service;
pub mod history_service;
pub mod prompt_service;
pub mod quiz_service;
pub mod study_service;
