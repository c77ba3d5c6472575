pub mod create_user_dto;
pub mod replace_user_dto;
pub mod user_list_query;
