pub mod study_dto;
