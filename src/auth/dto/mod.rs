pub mod login_dto;
pub mod register_dto;
