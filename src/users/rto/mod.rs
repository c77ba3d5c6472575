pub mod find_user_rto;
pub mod unauthorized_user_rto;
